use std::io::Write;

use clap::{Args, Subcommand};
use giftshop::{
    gift_cards::{GiftCard, Personalization},
    money,
    redemption::{RedemptionTransaction, Verification, display_status},
    shops::ShopUuid,
};
use giftshop_app::{context::AppContext, domain::gift_cards::data::NewGiftCard};
use jiff::Timestamp;
use uuid::Uuid;

use crate::cli::{blank, field, session::SessionArgs};

#[derive(Debug, Args)]
pub(crate) struct GiftCardCommand {
    #[command(subcommand)]
    command: GiftCardSubcommand,
}

#[derive(Debug, Subcommand)]
enum GiftCardSubcommand {
    /// Buy a gift card for a shop
    Purchase(PurchaseArgs),

    /// Check whether a code can be redeemed
    Verify(CodeArgs),

    /// Spend part or all of a gift card at the merchant's shop
    Redeem(RedeemArgs),

    /// Cancel a gift card issued by the merchant's shop
    Cancel(MerchantCodeArgs),

    /// Redemption history of a gift card
    History(CodeArgs),

    /// JSON payload for the gift card's QR code
    Qr(CodeArgs),

    /// Gift cards owned by the acting user
    Mine(SessionOnlyArgs),

    /// Gift cards sold by the merchant's shop
    Orders(SessionOnlyArgs),

    /// Sales totals for the merchant's shop
    Summary(SessionOnlyArgs),

    /// Mark gift cards past their expiry date as expired
    ExpireOverdue,
}

#[derive(Debug, Args)]
struct PurchaseArgs {
    /// Shop UUID
    #[arg(long)]
    shop: Uuid,

    /// Face amount; amounts the shop does not list are raised to its minimum
    #[arg(long)]
    amount: u64,

    /// Message printed with the card
    #[arg(long)]
    message: Option<String>,

    /// Name of the person receiving the card
    #[arg(long)]
    recipient_name: Option<String>,

    /// Email address of the person receiving the card
    #[arg(long)]
    recipient_email: Option<String>,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct CodeArgs {
    /// Gift card code
    code: String,
}

#[derive(Debug, Args)]
struct RedeemArgs {
    /// Gift card code
    code: String,

    /// Amount to spend
    #[arg(long)]
    amount: u64,

    /// What the amount was spent on
    #[arg(long)]
    description: Option<String>,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct MerchantCodeArgs {
    /// Gift card code
    code: String,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct SessionOnlyArgs {
    #[command(flatten)]
    session: SessionArgs,
}

pub(crate) async fn run(
    ctx: &AppContext,
    command: GiftCardCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        GiftCardSubcommand::Purchase(args) => purchase(ctx, args, out).await,
        GiftCardSubcommand::Verify(args) => verify(ctx, args, out).await,
        GiftCardSubcommand::Redeem(args) => redeem(ctx, args, out).await,
        GiftCardSubcommand::Cancel(args) => cancel(ctx, args, out).await,
        GiftCardSubcommand::History(args) => history(ctx, args, out).await,
        GiftCardSubcommand::Qr(args) => qr(ctx, args, out).await,
        GiftCardSubcommand::Mine(args) => mine(ctx, args, out).await,
        GiftCardSubcommand::Orders(args) => orders(ctx, args, out).await,
        GiftCardSubcommand::Summary(args) => summary(ctx, args, out).await,
        GiftCardSubcommand::ExpireOverdue => expire_overdue(ctx, out).await,
    }
}

async fn purchase(ctx: &AppContext, args: PurchaseArgs, out: &mut impl Write) -> Result<(), String> {
    let card = ctx
        .gift_cards
        .purchase_gift_card(
            args.session.session()?,
            NewGiftCard {
                shop: ShopUuid::from_uuid(args.shop),
                face_amount: args.amount,
                personalization: Personalization {
                    message: args.message,
                    recipient_name: args.recipient_name,
                    recipient_email: args.recipient_email,
                },
            },
        )
        .await
        .map_err(|error| format!("failed to purchase gift card: {error}"))?;

    render_gift_card(out, &card, Timestamp::now())
}

async fn verify(ctx: &AppContext, args: CodeArgs, out: &mut impl Write) -> Result<(), String> {
    let verification = ctx
        .redemptions
        .verify(&args.code)
        .await
        .map_err(|error| format!("failed to verify gift card: {error}"))?;

    match verification {
        Verification::Valid {
            gift_card,
            max_redeemable,
        } => {
            field(out, "valid", true)?;
            field(out, "code", &gift_card.code)?;
            field(out, "max_redeemable", money::display(max_redeemable))
        }
        Verification::Invalid { error } => {
            field(out, "valid", false)?;
            field(out, "error", error)
        }
    }
}

async fn redeem(ctx: &AppContext, args: RedeemArgs, out: &mut impl Write) -> Result<(), String> {
    let outcome = ctx
        .redemptions
        .redeem(
            args.session.session()?,
            &args.code,
            args.amount,
            args.description,
        )
        .await
        .map_err(|error| format!("failed to redeem gift card: {error}"))?;

    field(out, "transaction_uuid", outcome.transaction.uuid)?;
    field(out, "amount_used", money::display(outcome.transaction.amount_used))?;
    field(out, "remaining_value", money::display(outcome.remaining_value))?;
    field(out, "fully_used", outcome.fully_used)
}

async fn cancel(
    ctx: &AppContext,
    args: MerchantCodeArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let card = ctx
        .gift_cards
        .cancel_gift_card(args.session.session()?, &args.code)
        .await
        .map_err(|error| format!("failed to cancel gift card: {error}"))?;

    render_gift_card(out, &card, Timestamp::now())
}

async fn history(ctx: &AppContext, args: CodeArgs, out: &mut impl Write) -> Result<(), String> {
    let card = ctx
        .gift_cards
        .find_by_code(&args.code)
        .await
        .map_err(|error| format!("failed to find gift card: {error}"))?;

    let transactions = ctx
        .redemptions
        .list_transactions(card.uuid)
        .await
        .map_err(|error| format!("failed to list transactions: {error}"))?;

    if transactions.is_empty() {
        return field(out, "transactions", "none");
    }

    for transaction in transactions {
        render_transaction(out, &transaction)?;
        blank(out)?;
    }

    Ok(())
}

async fn qr(ctx: &AppContext, args: CodeArgs, out: &mut impl Write) -> Result<(), String> {
    let payload = ctx
        .gift_cards
        .qr_payload(&args.code)
        .await
        .map_err(|error| format!("failed to build QR payload: {error}"))?;

    let json = payload
        .to_json()
        .map_err(|error| format!("failed to serialize QR payload: {error}"))?;

    writeln!(out, "{json}").map_err(crate::cli::write_failed)
}

async fn mine(ctx: &AppContext, args: SessionOnlyArgs, out: &mut impl Write) -> Result<(), String> {
    let cards = ctx
        .gift_cards
        .list_owner_gift_cards(args.session.session()?)
        .await
        .map_err(|error| format!("failed to list gift cards: {error}"))?;

    render_gift_cards(out, &cards)
}

async fn orders(
    ctx: &AppContext,
    args: SessionOnlyArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let (session, shop) = args.session.merchant()?;

    let cards = ctx
        .gift_cards
        .list_shop_gift_cards(session, shop)
        .await
        .map_err(|error| format!("failed to list gift cards: {error}"))?;

    render_gift_cards(out, &cards)
}

async fn summary(
    ctx: &AppContext,
    args: SessionOnlyArgs,
    out: &mut impl Write,
) -> Result<(), String> {
    let (session, shop) = args.session.merchant()?;

    let summary = ctx
        .gift_cards
        .shop_summary(session, shop)
        .await
        .map_err(|error| format!("failed to summarize gift cards: {error}"))?;

    field(out, "cards_sold", summary.cards_sold)?;
    field(out, "face_value_sold", money::display(summary.face_value_sold))?;
    field(out, "value_redeemed", money::display(summary.value_redeemed))?;
    field(
        out,
        "outstanding_balance",
        money::display(summary.outstanding_balance),
    )
}

async fn expire_overdue(ctx: &AppContext, out: &mut impl Write) -> Result<(), String> {
    let expired = ctx
        .gift_cards
        .expire_overdue(Timestamp::now())
        .await
        .map_err(|error| format!("failed to expire gift cards: {error}"))?;

    field(out, "expired", expired)
}

fn render_gift_cards(out: &mut impl Write, cards: &[GiftCard]) -> Result<(), String> {
    if cards.is_empty() {
        return field(out, "gift_cards", "none");
    }

    let now = Timestamp::now();

    for card in cards {
        render_gift_card(out, card, now)?;
        blank(out)?;
    }

    Ok(())
}

fn render_gift_card(out: &mut impl Write, card: &GiftCard, now: Timestamp) -> Result<(), String> {
    field(out, "gift_card_uuid", card.uuid)?;
    field(out, "code", &card.code)?;
    field(out, "shop_uuid", card.shop)?;
    field(out, "face_amount", money::display(card.face_amount))?;
    field(out, "remaining_value", money::display(card.remaining_value))?;
    field(out, "status", display_status(card, now))?;
    field(out, "purchased_at", card.purchased_at)?;
    field(
        out,
        "expires_at",
        card.expires_at
            .map_or_else(|| "never".to_string(), |value| value.to_string()),
    )
}

fn render_transaction(out: &mut impl Write, transaction: &RedemptionTransaction) -> Result<(), String> {
    field(out, "transaction_uuid", transaction.uuid)?;
    field(out, "shop_uuid", transaction.shop)?;
    field(out, "amount_used", money::display(transaction.amount_used))?;
    field(
        out,
        "description",
        transaction.description.as_deref().unwrap_or("-"),
    )?;
    field(out, "transaction_date", transaction.transaction_date)
}
