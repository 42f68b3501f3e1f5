use std::io::{self, Write};

use clap::{Parser, Subcommand};
use giftshop_app::{config::AppConfig, context::AppContext};

mod db;
mod discount;
mod gift_card;
mod session;
mod shop;

#[derive(Debug, Parser)]
#[command(name = "giftshop", about = "Gift card marketplace CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Shop(shop::ShopCommand),
    Discount(discount::DiscountCommand),
    GiftCard(gift_card::GiftCardCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let mut out = io::stdout().lock();

        match self.command {
            Commands::Db(command) => db::run(&self.config, command, &mut out).await,
            command => {
                let ctx = AppContext::from_config(&self.config)
                    .await
                    .map_err(|error| format!("failed to initialise: {error}"))?;

                dispatch(&ctx, command, &mut out).await
            }
        }
    }
}

async fn dispatch(ctx: &AppContext, command: Commands, out: &mut impl Write) -> Result<(), String> {
    match command {
        Commands::Shop(command) => shop::run(ctx, command, out).await,
        Commands::Discount(command) => discount::run(ctx, command, out).await,
        Commands::GiftCard(command) => gift_card::run(ctx, command, out).await,
        Commands::Db(_) => Err("database commands do not use the service context".to_string()),
    }
}

pub(crate) fn write_failed(error: io::Error) -> String {
    format!("failed to write output: {error}")
}

/// Write `key: value`, the line format every command prints.
pub(crate) fn field(
    out: &mut impl Write,
    key: &str,
    value: impl std::fmt::Display,
) -> Result<(), String> {
    writeln!(out, "{key}: {value}").map_err(write_failed)
}

pub(crate) fn blank(out: &mut impl Write) -> Result<(), String> {
    writeln!(out).map_err(write_failed)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use giftshop_app::{
        context::AppContext,
        domain::{
            discounts::MockDiscountsService, gift_cards::MockGiftCardsService,
            pricing::MockPricingService, redemptions::MockRedemptionsService,
            shops::MockShopsService,
        },
    };

    /// Context whose services all panic on any call; tests swap in the mock they need.
    pub(crate) fn context() -> AppContext {
        AppContext {
            shops: Arc::new(MockShopsService::new()),
            discounts: Arc::new(MockDiscountsService::new()),
            gift_cards: Arc::new(MockGiftCardsService::new()),
            redemptions: Arc::new(MockRedemptionsService::new()),
            pricing: Arc::new(MockPricingService::new()),
        }
    }

    pub(crate) fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).expect("command output should be UTF-8")
    }
}
