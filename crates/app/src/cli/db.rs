use std::io::Write;

use clap::{Args, Subcommand};
use giftshop_app::{config::AppConfig, database};

use crate::cli::field;

#[derive(Debug, Args)]
pub(crate) struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending schema migrations
    Migrate,
}

pub(crate) async fn run(
    config: &AppConfig,
    command: DbCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        DbSubcommand::Migrate => migrate(config, out).await,
    }
}

async fn migrate(config: &AppConfig, out: &mut impl Write) -> Result<(), String> {
    let pool = database::connect(config.database.url()?)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    field(out, "migrations", "up to date")
}
