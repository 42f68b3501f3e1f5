//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{AppConfig, PolicyConfig},
    database::{self, Db},
    domain::{
        discounts::{DiscountsService, PgDiscountsService},
        gift_cards::{GiftCardsService, PgGiftCardsService},
        pricing::{PgPricingService, PricingService},
        redemptions::{PgRedemptionsService, RedemptionsService},
        shops::{PgShopsService, ShopsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("{0}")]
    Config(String),

    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub shops: Arc<dyn ShopsService>,
    pub discounts: Arc<dyn DiscountsService>,
    pub gift_cards: Arc<dyn GiftCardsService>,
    pub redemptions: Arc<dyn RedemptionsService>,
    pub pricing: Arc<dyn PricingService>,
}

impl AppContext {
    /// Wire the `PostgreSQL` services onto `db`.
    #[must_use]
    pub fn new(db: Db, policy: &PolicyConfig) -> Self {
        Self {
            shops: Arc::new(PgShopsService::new(db.clone())),
            discounts: Arc::new(PgDiscountsService::new(db.clone())),
            gift_cards: Arc::new(PgGiftCardsService::new(db.clone(), policy.validity())),
            redemptions: Arc::new(PgRedemptionsService::new(db.clone(), policy.redemption())),
            pricing: Arc::new(PgPricingService::new(db)),
        }
    }

    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when no database URL is configured or connecting fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let url = config.database.url().map_err(AppInitError::Config)?;

        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::new(Db::new(pool), &config.policy))
    }
}
