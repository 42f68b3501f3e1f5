use std::io::Write;

use clap::{Args, Subcommand};
use giftshop::{
    money,
    pricing::PricingOption,
    shops::{Shop, ShopUuid},
};
use giftshop_app::{context::AppContext, domain::shops::data::NewShop};
use uuid::Uuid;

use crate::cli::{blank, field};

#[derive(Debug, Args)]
pub(crate) struct ShopCommand {
    #[command(subcommand)]
    command: ShopSubcommand,
}

#[derive(Debug, Subcommand)]
enum ShopSubcommand {
    /// Register a shop
    Create(CreateShopArgs),

    /// Show a shop
    Get(ShopArgs),

    /// List all shops
    List,

    /// Gift card options a customer can buy, with discounts applied
    Options(OptionsArgs),

    /// Suggested gift card amounts derived from the shop minimum
    Tiers(ShopArgs),
}

#[derive(Debug, Args)]
struct CreateShopArgs {
    /// Shop display name
    #[arg(long)]
    name: String,

    /// Gift card denominations offered, comma separated
    #[arg(long = "prices", value_delimiter = ',', required = true)]
    gift_card_prices: Vec<u64>,

    /// Smallest gift card amount, used for custom amounts
    #[arg(long = "min-amount")]
    min_gift_card_amount: u64,

    /// Optional shop UUID; generated when omitted
    #[arg(long)]
    shop_uuid: Option<Uuid>,
}

#[derive(Debug, Args)]
struct ShopArgs {
    /// Shop UUID
    shop: Uuid,
}

#[derive(Debug, Args)]
struct OptionsArgs {
    /// Shop UUID
    shop: Uuid,

    /// Also show what a custom amount would be issued at
    #[arg(long)]
    custom: Option<u64>,
}

pub(crate) async fn run(
    ctx: &AppContext,
    command: ShopCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        ShopSubcommand::Create(args) => create(ctx, args, out).await,
        ShopSubcommand::Get(args) => get(ctx, args, out).await,
        ShopSubcommand::List => list(ctx, out).await,
        ShopSubcommand::Options(args) => options(ctx, args, out).await,
        ShopSubcommand::Tiers(args) => tiers(ctx, args, out).await,
    }
}

async fn create(ctx: &AppContext, args: CreateShopArgs, out: &mut impl Write) -> Result<(), String> {
    let shop = ctx
        .shops
        .create_shop(NewShop {
            uuid: args.shop_uuid.map_or_else(ShopUuid::new, ShopUuid::from_uuid),
            name: args.name,
            gift_card_prices: args.gift_card_prices,
            min_gift_card_amount: args.min_gift_card_amount,
        })
        .await
        .map_err(|error| format!("failed to create shop: {error}"))?;

    render_shop(out, &shop)
}

async fn get(ctx: &AppContext, args: ShopArgs, out: &mut impl Write) -> Result<(), String> {
    let shop = ctx
        .shops
        .get_shop(ShopUuid::from_uuid(args.shop))
        .await
        .map_err(|error| format!("failed to get shop: {error}"))?;

    render_shop(out, &shop)
}

async fn list(ctx: &AppContext, out: &mut impl Write) -> Result<(), String> {
    let shops = ctx
        .shops
        .list_shops()
        .await
        .map_err(|error| format!("failed to list shops: {error}"))?;

    if shops.is_empty() {
        return field(out, "shops", "none");
    }

    for shop in shops {
        render_shop(out, &shop)?;
        blank(out)?;
    }

    Ok(())
}

async fn options(ctx: &AppContext, args: OptionsArgs, out: &mut impl Write) -> Result<(), String> {
    let shop = ShopUuid::from_uuid(args.shop);

    let options = ctx
        .pricing
        .resolve_options(shop)
        .await
        .map_err(|error| format!("failed to resolve options: {error}"))?;

    for option in &options {
        render_option(out, option)?;
    }

    if let Some(requested) = args.custom {
        let amount = ctx
            .pricing
            .custom_amount(shop, requested)
            .await
            .map_err(|error| format!("failed to price custom amount: {error}"))?;

        field(out, "custom_amount", money::display(amount))?;
    }

    Ok(())
}

async fn tiers(ctx: &AppContext, args: ShopArgs, out: &mut impl Write) -> Result<(), String> {
    let amounts = ctx
        .pricing
        .suggested_amounts(ShopUuid::from_uuid(args.shop))
        .await
        .map_err(|error| format!("failed to suggest amounts: {error}"))?;

    for amount in amounts {
        field(out, "tier", money::display(amount))?;
    }

    Ok(())
}

fn render_shop(out: &mut impl Write, shop: &Shop) -> Result<(), String> {
    let prices = shop
        .gift_card_prices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    field(out, "shop_uuid", shop.uuid)?;
    field(out, "name", &shop.name)?;
    field(out, "gift_card_prices", prices)?;
    field(out, "min_gift_card_amount", shop.min_gift_card_amount)
}

fn render_option(out: &mut impl Write, option: &PricingOption) -> Result<(), String> {
    match (option.discounted_price, option.discount_percentage) {
        (Some(price), Some(percentage)) => field(
            out,
            "option",
            format!(
                "{} for {} ({percentage}% off)",
                money::display(option.amount),
                money::display(price)
            ),
        ),
        _ => field(out, "option", money::display(option.amount)),
    }
}
