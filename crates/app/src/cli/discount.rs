use std::io::Write;

use clap::{Args, Subcommand};
use giftshop::{
    discounts::{DiscountRule, DiscountUuid},
    money,
    shops::ShopUuid,
};
use giftshop_app::context::AppContext;
use uuid::Uuid;

use crate::cli::{blank, field, session::SessionArgs};

#[derive(Debug, Args)]
pub(crate) struct DiscountCommand {
    #[command(subcommand)]
    command: DiscountSubcommand,
}

#[derive(Debug, Subcommand)]
enum DiscountSubcommand {
    /// List a shop's discount rules; merchants also see inactive rules
    List(ListDiscountsArgs),

    /// Discount a gift card amount of the merchant's shop
    Create(CreateDiscountArgs),

    /// Activate a discount rule
    Enable(DiscountArgs),

    /// Deactivate a discount rule
    Disable(DiscountArgs),

    /// Permanently remove a discount rule
    Delete(DiscountArgs),
}

#[derive(Debug, Args)]
struct ListDiscountsArgs {
    /// Shop UUID
    shop: Uuid,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct CreateDiscountArgs {
    /// Gift card amount the discount applies to
    #[arg(long)]
    amount: u64,

    /// Percentage off, between 1 and 99
    #[arg(long, allow_negative_numbers = true)]
    percentage: i64,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct DiscountArgs {
    /// Discount rule UUID
    discount: Uuid,

    #[command(flatten)]
    session: SessionArgs,
}

pub(crate) async fn run(
    ctx: &AppContext,
    command: DiscountCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        DiscountSubcommand::List(args) => list(ctx, args, out).await,
        DiscountSubcommand::Create(args) => create(ctx, args, out).await,
        DiscountSubcommand::Enable(args) => set_active(ctx, args, true, out).await,
        DiscountSubcommand::Disable(args) => set_active(ctx, args, false, out).await,
        DiscountSubcommand::Delete(args) => delete(ctx, args, out).await,
    }
}

async fn list(ctx: &AppContext, args: ListDiscountsArgs, out: &mut impl Write) -> Result<(), String> {
    let shop = ShopUuid::from_uuid(args.shop);

    let rules = if args.session.is_present() {
        ctx.discounts
            .list_discounts(args.session.session()?, shop)
            .await
    } else {
        ctx.discounts.list_active_discounts(shop).await
    }
    .map_err(|error| format!("failed to list discounts: {error}"))?;

    if rules.is_empty() {
        return field(out, "discounts", "none");
    }

    for rule in rules {
        render_rule(out, &rule)?;
        blank(out)?;
    }

    Ok(())
}

async fn create(
    ctx: &AppContext,
    args: CreateDiscountArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let (session, shop) = args.session.merchant()?;

    let rule = ctx
        .discounts
        .create_discount(session, shop, args.amount, args.percentage)
        .await
        .map_err(|error| format!("failed to create discount: {error}"))?;

    render_rule(out, &rule)
}

async fn set_active(
    ctx: &AppContext,
    args: DiscountArgs,
    is_active: bool,
    out: &mut impl Write,
) -> Result<(), String> {
    let rule = ctx
        .discounts
        .set_discount_active(
            args.session.session()?,
            DiscountUuid::from_uuid(args.discount),
            is_active,
        )
        .await
        .map_err(|error| format!("failed to update discount: {error}"))?;

    render_rule(out, &rule)
}

async fn delete(ctx: &AppContext, args: DiscountArgs, out: &mut impl Write) -> Result<(), String> {
    ctx.discounts
        .delete_discount(args.session.session()?, DiscountUuid::from_uuid(args.discount))
        .await
        .map_err(|error| format!("failed to delete discount: {error}"))?;

    field(out, "deleted", args.discount)
}

fn render_rule(out: &mut impl Write, rule: &DiscountRule) -> Result<(), String> {
    field(out, "discount_uuid", rule.uuid)?;
    field(out, "gift_card_amount", rule.gift_card_amount)?;
    field(out, "percentage", rule.percentage)?;
    field(out, "price", money::display(rule.discounted_price()))?;
    field(out, "active", rule.is_active)
}
