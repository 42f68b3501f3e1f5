//! Shops service.

use async_trait::async_trait;
use giftshop::shops::{Shop, ShopUuid};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::shops::{
        data::NewShop, errors::ShopsServiceError, repository::PgShopsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgShopsService {
    db: Db,
    repository: PgShopsRepository,
}

impl PgShopsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgShopsRepository::new(),
        }
    }
}

#[async_trait]
impl ShopsService for PgShopsService {
    #[tracing::instrument(
        name = "shops.service.create_shop",
        skip(self, shop),
        fields(shop_uuid = %shop.uuid),
        err
    )]
    async fn create_shop(&self, shop: NewShop) -> Result<Shop, ShopsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_shop(&mut tx, shop).await?;

        tx.commit().await?;

        info!(shop_uuid = %created.uuid, name = %created.name, "registered shop");

        Ok(created)
    }

    async fn get_shop(&self, shop: ShopUuid) -> Result<Shop, ShopsServiceError> {
        let mut tx = self.db.begin().await?;

        let shop = self.repository.get_shop(&mut tx, shop).await?;

        tx.commit().await?;

        Ok(shop)
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, ShopsServiceError> {
        let mut tx = self.db.begin().await?;

        let shops = self.repository.list_shops(&mut tx).await?;

        tx.commit().await?;

        Ok(shops)
    }
}

/// Read side of the shop catalog, plus merchant registration.
#[automock]
#[async_trait]
pub trait ShopsService: Send + Sync {
    /// Registers a new shop.
    async fn create_shop(&self, shop: NewShop) -> Result<Shop, ShopsServiceError>;

    /// Retrieve a single shop.
    async fn get_shop(&self, shop: ShopUuid) -> Result<Shop, ShopsServiceError>;

    /// Retrieves all shops, ordered by name.
    async fn list_shops(&self) -> Result<Vec<Shop>, ShopsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_shop(name: &str, prices: &[u64], min: u64) -> NewShop {
        NewShop {
            uuid: ShopUuid::new(),
            name: name.to_string(),
            gift_card_prices: prices.to_vec(),
            min_gift_card_amount: min,
        }
    }

    #[tokio::test]
    async fn create_shop_returns_stored_catalog_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = new_shop("Forno Rossi", &[25, 50, 100], 25);

        let created = ctx.shops.create_shop(shop.clone()).await?;

        assert_eq!(created.uuid, shop.uuid);
        assert_eq!(created.name, "Forno Rossi");
        assert_eq!(created.gift_card_prices, [25, 50, 100]);
        assert_eq!(created.min_gift_card_amount, 25);

        Ok(())
    }

    #[tokio::test]
    async fn get_shop_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.shops.get_shop(ShopUuid::new()).await;

        assert!(
            matches!(result, Err(ShopsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_shop_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = new_shop("Libreria Blu", &[20], 20);

        ctx.shops.create_shop(shop.clone()).await?;

        let result = ctx.shops.create_shop(shop).await;

        assert!(
            matches!(result, Err(ShopsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_shop_zero_minimum_returns_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx.shops.create_shop(new_shop("Bar Sport", &[10], 0)).await;

        assert!(
            matches!(result, Err(ShopsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_shops_is_ordered_by_name() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.shops.create_shop(new_shop("Zucchero", &[10], 10)).await?;
        ctx.shops.create_shop(new_shop("Alimentari", &[10], 10)).await?;

        let names: Vec<String> = ctx
            .shops
            .list_shops()
            .await?
            .into_iter()
            .map(|shop| shop.name)
            .collect();

        assert_eq!(names, ["Alimentari", "Zucchero"]);

        Ok(())
    }
}
