//! Discounts service.

use async_trait::async_trait;
use giftshop::{
    discounts::{DiscountRule, DiscountUuid, NewDiscountRule},
    session::Session,
    shops::ShopUuid,
};
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::discounts::{errors::DiscountsServiceError, repository::PgDiscountsRepository},
};

#[derive(Debug, Clone)]
pub struct PgDiscountsService {
    db: Db,
    repository: PgDiscountsRepository,
}

impl PgDiscountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDiscountsRepository::new(),
        }
    }
}

#[async_trait]
impl DiscountsService for PgDiscountsService {
    async fn list_active_discounts(
        &self,
        shop: ShopUuid,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        let discounts = self.repository.list_discounts(&mut tx, shop, true).await?;

        tx.commit().await?;

        Ok(discounts)
    }

    async fn list_discounts(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError> {
        session.merchant_for(shop)?;

        let mut tx = self.db.begin().await?;

        let discounts = self.repository.list_discounts(&mut tx, shop, false).await?;

        tx.commit().await?;

        Ok(discounts)
    }

    #[tracing::instrument(
        name = "discounts.service.create_discount",
        skip(self, session),
        fields(merchant_uuid = %session.user()),
        err
    )]
    async fn create_discount(
        &self,
        session: Session,
        shop: ShopUuid,
        gift_card_amount: u64,
        discount_percentage: i64,
    ) -> Result<DiscountRule, DiscountsServiceError> {
        session.merchant_for(shop)?;

        let rule = NewDiscountRule::new(shop, gift_card_amount, discount_percentage)?;

        let mut tx = self.db.begin().await?;

        if self
            .repository
            .discount_exists(&mut tx, shop, gift_card_amount)
            .await?
        {
            return Err(DiscountsServiceError::DuplicateRule);
        }

        let created = self
            .repository
            .create_discount(&mut tx, DiscountUuid::new(), rule)
            .await?;

        tx.commit().await?;

        info!(
            discount_uuid = %created.uuid,
            gift_card_amount = created.gift_card_amount,
            percentage = created.percentage.get(),
            "created discount rule"
        );

        Ok(created)
    }

    #[tracing::instrument(
        name = "discounts.service.set_discount_active",
        skip(self, session),
        fields(merchant_uuid = %session.user()),
        err
    )]
    async fn set_discount_active(
        &self,
        session: Session,
        discount: DiscountUuid,
        is_active: bool,
    ) -> Result<DiscountRule, DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.repository.get_discount(&mut tx, discount).await?;

        session.merchant_for(existing.shop)?;

        if existing.is_active == is_active {
            tx.commit().await?;

            return Ok(existing);
        }

        let updated = self
            .repository
            .set_discount_active(&mut tx, discount, is_active)
            .await?;

        tx.commit().await?;

        info!(discount_uuid = %discount, is_active, "toggled discount rule");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "discounts.service.delete_discount",
        skip(self, session),
        fields(merchant_uuid = %session.user()),
        err
    )]
    async fn delete_discount(
        &self,
        session: Session,
        discount: DiscountUuid,
    ) -> Result<(), DiscountsServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.repository.get_discount(&mut tx, discount).await?;

        session.merchant_for(existing.shop)?;

        let rows_affected = self.repository.delete_discount(&mut tx, discount).await?;

        if rows_affected == 0 {
            return Err(DiscountsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(discount_uuid = %discount, "deleted discount rule");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Active rules for a shop, ascending by gift card amount.
    async fn list_active_discounts(
        &self,
        shop: ShopUuid,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError>;

    /// Every rule for a shop, active or not, ascending by gift card amount.
    async fn list_discounts(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<Vec<DiscountRule>, DiscountsServiceError>;

    /// Creates an active rule. Only one rule may exist per shop and gift card amount.
    async fn create_discount(
        &self,
        session: Session,
        shop: ShopUuid,
        gift_card_amount: u64,
        discount_percentage: i64,
    ) -> Result<DiscountRule, DiscountsServiceError>;

    /// Activates or deactivates a rule. Setting the current state again is a no-op.
    async fn set_discount_active(
        &self,
        session: Session,
        discount: DiscountUuid,
        is_active: bool,
    ) -> Result<DiscountRule, DiscountsServiceError>;

    /// Permanently removes a rule.
    async fn delete_discount(
        &self,
        session: Session,
        discount: DiscountUuid,
    ) -> Result<(), DiscountsServiceError>;
}
