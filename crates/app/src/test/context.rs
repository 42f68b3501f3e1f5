//! Test context for service-level integration tests.

use giftshop::{
    gift_cards::{GiftCardUuid, ValidityPolicy},
    redemption::RedemptionPolicy,
    session::{Session, UserUuid},
    shops::{Shop, ShopUuid},
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;

use crate::{
    database::Db,
    domain::{
        discounts::PgDiscountsService,
        gift_cards::PgGiftCardsService,
        pricing::PgPricingService,
        redemptions::PgRedemptionsService,
        shops::{PgShopsService, ShopsService, ShopsServiceError, data::NewShop},
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub shops: PgShopsService,
    pub discounts: PgDiscountsService,
    pub gift_cards: PgGiftCardsService,
    pub redemptions: PgRedemptionsService,
    pub pricing: PgPricingService,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_policies(ValidityPolicy::default(), RedemptionPolicy::default()).await
    }

    pub async fn with_validity(validity: ValidityPolicy) -> Self {
        Self::with_policies(validity, RedemptionPolicy::default()).await
    }

    pub async fn with_redemption_policy(redemption: RedemptionPolicy) -> Self {
        Self::with_policies(ValidityPolicy::default(), redemption).await
    }

    async fn with_policies(validity: ValidityPolicy, redemption: RedemptionPolicy) -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            shops: PgShopsService::new(db.clone()),
            discounts: PgDiscountsService::new(db.clone()),
            gift_cards: PgGiftCardsService::new(db.clone(), validity),
            redemptions: PgRedemptionsService::new(db.clone(), redemption),
            pricing: PgPricingService::new(db),
            db: test_db,
        }
    }

    /// Register a shop and return it with a session for its merchant.
    pub async fn create_shop(
        &self,
        prices: &[u64],
        min_gift_card_amount: u64,
    ) -> Result<(Shop, Session), ShopsServiceError> {
        let uuid = ShopUuid::new();

        let shop = self
            .shops
            .create_shop(NewShop {
                uuid,
                name: format!("Shop {uuid}"),
                gift_card_prices: prices.to_vec(),
                min_gift_card_amount,
            })
            .await?;

        Ok((shop, Session::merchant(UserUuid::new(), uuid)))
    }

    /// Overwrite a card's expiry date, bypassing the services.
    pub async fn set_expiry(
        &self,
        gift_card: GiftCardUuid,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE gift_cards SET expires_at = $2 WHERE uuid = $1")
            .bind(gift_card.into_uuid())
            .bind(SqlxTimestamp::from(expires_at))
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
