//! Application configuration
//!
//! Every setting can be given as a flag or through the environment; a `.env` file in the working
//! directory is loaded first.

use clap::Args;

pub mod db;
pub mod logging;
pub mod policy;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use policy::PolicyConfig;

/// Giftshop configuration
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Gift card business rules.
    #[command(flatten)]
    pub policy: PolicyConfig,
}
