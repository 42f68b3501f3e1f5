use giftshop::{gift_cards::GiftCardUuid, redemption::RedemptionPlan};
use sqlx::{Postgres, Transaction, query};

use crate::database::try_i64_from_u64;

const APPLY_REDEMPTION_SQL: &str = include_str!("../sql/apply_redemption.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBalancesRepository;

impl PgBalancesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Write the planned balance, but only if nobody else changed the card since it was read.
    ///
    /// Returns the number of rows updated: zero means the guard failed.
    pub(crate) async fn apply_redemption(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gift_card: GiftCardUuid,
        plan: &RedemptionPlan,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(APPLY_REDEMPTION_SQL)
            .bind(gift_card.into_uuid())
            .bind(try_i64_from_u64(plan.expected_remaining, "remaining_value")?)
            .bind(try_i64_from_u64(plan.remaining_value, "remaining_value")?)
            .bind(plan.status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
