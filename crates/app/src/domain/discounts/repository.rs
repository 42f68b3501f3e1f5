//! Discounts Repository

use giftshop::{
    discounts::{DiscountPercentage, DiscountRule, DiscountUuid, NewDiscountRule},
    shops::ShopUuid,
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query, query_scalar};

use crate::database::{try_get_amount, try_i64_from_u64};

const LIST_DISCOUNTS_SQL: &str = include_str!("sql/list_discounts.sql");
const GET_DISCOUNT_SQL: &str = include_str!("sql/get_discount.sql");
const DISCOUNT_EXISTS_SQL: &str = include_str!("sql/discount_exists.sql");
const CREATE_DISCOUNT_SQL: &str = include_str!("sql/create_discount.sql");
const SET_DISCOUNT_ACTIVE_SQL: &str = include_str!("sql/set_discount_active.sql");
const DELETE_DISCOUNT_SQL: &str = include_str!("sql/delete_discount.sql");

const COLUMN_GIFT_CARD_AMOUNT: &str = "gift_card_amount";
const COLUMN_DISCOUNT_PERCENTAGE: &str = "discount_percentage";

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDiscountsRepository;

impl PgDiscountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_discounts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: ShopUuid,
        active_only: bool,
    ) -> Result<Vec<DiscountRule>, sqlx::Error> {
        query(LIST_DISCOUNTS_SQL)
            .bind(shop.into_uuid())
            .bind(active_only)
            .try_map(|row: PgRow| discount_from_row(&row))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
    ) -> Result<DiscountRule, sqlx::Error> {
        query(GET_DISCOUNT_SQL)
            .bind(discount.into_uuid())
            .try_map(|row: PgRow| discount_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    /// Whether any rule, active or not, targets `gift_card_amount` at `shop`.
    pub(crate) async fn discount_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: ShopUuid,
        gift_card_amount: u64,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(DISCOUNT_EXISTS_SQL)
            .bind(shop.into_uuid())
            .bind(try_i64_from_u64(gift_card_amount, COLUMN_GIFT_CARD_AMOUNT)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
        rule: NewDiscountRule,
    ) -> Result<DiscountRule, sqlx::Error> {
        query(CREATE_DISCOUNT_SQL)
            .bind(discount.into_uuid())
            .bind(rule.shop.into_uuid())
            .bind(try_i64_from_u64(
                rule.gift_card_amount,
                COLUMN_GIFT_CARD_AMOUNT,
            )?)
            .bind(i16::from(rule.percentage.get()))
            .try_map(|row: PgRow| discount_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_discount_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
        is_active: bool,
    ) -> Result<DiscountRule, sqlx::Error> {
        query(SET_DISCOUNT_ACTIVE_SQL)
            .bind(discount.into_uuid())
            .bind(is_active)
            .try_map(|row: PgRow| discount_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_discount(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        discount: DiscountUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_DISCOUNT_SQL)
            .bind(discount.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn discount_from_row(row: &PgRow) -> sqlx::Result<DiscountRule> {
    let percentage: i16 = row.try_get(COLUMN_DISCOUNT_PERCENTAGE)?;

    let percentage = DiscountPercentage::new(i64::from(percentage)).map_err(|e| {
        sqlx::Error::ColumnDecode {
            index: COLUMN_DISCOUNT_PERCENTAGE.to_string(),
            source: Box::new(e),
        }
    })?;

    Ok(DiscountRule {
        uuid: DiscountUuid::from_uuid(row.try_get("uuid")?),
        shop: ShopUuid::from_uuid(row.try_get("shop_uuid")?),
        gift_card_amount: try_get_amount(row, COLUMN_GIFT_CARD_AMOUNT)?,
        percentage,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
    })
}
