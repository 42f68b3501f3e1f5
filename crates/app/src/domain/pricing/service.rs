//! Pricing service.

use async_trait::async_trait;
use giftshop::{
    pricing::{PricingOption, calculate_gift_card_amounts, resolve_options, validate_custom_amount},
    shops::ShopUuid,
};
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        discounts::repository::PgDiscountsRepository, pricing::errors::PricingServiceError,
        shops::repository::PgShopsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPricingService {
    db: Db,
    shops_repository: PgShopsRepository,
    discounts_repository: PgDiscountsRepository,
}

impl PgPricingService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            shops_repository: PgShopsRepository::new(),
            discounts_repository: PgDiscountsRepository::new(),
        }
    }
}

#[async_trait]
impl PricingService for PgPricingService {
    async fn resolve_options(
        &self,
        shop: ShopUuid,
    ) -> Result<Vec<PricingOption>, PricingServiceError> {
        let mut tx = self.db.begin().await?;

        let catalog = self.shops_repository.get_shop(&mut tx, shop).await?;
        let rules = self
            .discounts_repository
            .list_discounts(&mut tx, shop, true)
            .await?;

        tx.commit().await?;

        Ok(resolve_options(&catalog, &rules))
    }

    async fn custom_amount(
        &self,
        shop: ShopUuid,
        requested: u64,
    ) -> Result<u64, PricingServiceError> {
        let mut tx = self.db.begin().await?;

        let catalog = self.shops_repository.get_shop(&mut tx, shop).await?;

        tx.commit().await?;

        Ok(validate_custom_amount(&catalog, requested))
    }

    async fn suggested_amounts(&self, shop: ShopUuid) -> Result<[u64; 3], PricingServiceError> {
        let mut tx = self.db.begin().await?;

        let catalog = self.shops_repository.get_shop(&mut tx, shop).await?;

        tx.commit().await?;

        Ok(calculate_gift_card_amounts(catalog.min_gift_card_amount))
    }
}

/// What a customer pays for each gift card a shop offers.
#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Purchasable options for a shop, cheapest first.
    async fn resolve_options(&self, shop: ShopUuid)
    -> Result<Vec<PricingOption>, PricingServiceError>;

    /// The amount a custom request would be issued at.
    async fn custom_amount(&self, shop: ShopUuid, requested: u64)
    -> Result<u64, PricingServiceError>;

    /// Three suggested amounts derived from the shop minimum.
    async fn suggested_amounts(&self, shop: ShopUuid) -> Result<[u64; 3], PricingServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::discounts::DiscountsService, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn resolve_options_places_discounts_next_to_regular_prices() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[25, 50, 100], 25).await?;

        ctx.discounts
            .create_discount(merchant, shop.uuid, 50, 10)
            .await?;

        let options = ctx.pricing.resolve_options(shop.uuid).await?;

        assert_eq!(
            options,
            [
                PricingOption::regular(25),
                PricingOption::regular(50),
                PricingOption {
                    amount: 50,
                    original_price: 50,
                    discounted_price: Some(45),
                    discount_percentage: Some(10),
                    is_discounted: true,
                },
                PricingOption::regular(100),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn resolve_options_ignores_inactive_rules() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[50], 25).await?;

        let rule = ctx
            .discounts
            .create_discount(merchant, shop.uuid, 50, 10)
            .await?;

        ctx.discounts
            .set_discount_active(merchant, rule.uuid, false)
            .await?;

        let options = ctx.pricing.resolve_options(shop.uuid).await?;

        assert_eq!(options, [PricingOption::regular(50)]);

        Ok(())
    }

    #[tokio::test]
    async fn resolve_options_unknown_shop_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.pricing.resolve_options(ShopUuid::new()).await;

        assert!(
            matches!(result, Err(PricingServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn custom_amount_is_raised_to_minimum() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25], 25).await?;

        assert_eq!(ctx.pricing.custom_amount(shop.uuid, 10).await?, 25);
        assert_eq!(ctx.pricing.custom_amount(shop.uuid, 60).await?, 60);

        Ok(())
    }

    #[tokio::test]
    async fn suggested_amounts_double_from_minimum() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[20], 20).await?;

        assert_eq!(ctx.pricing.suggested_amounts(shop.uuid).await?, [20, 40, 80]);

        Ok(())
    }
}
