//! Shops Repository

use giftshop::shops::{Shop, ShopUuid};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};

use crate::{
    database::{try_get_amount, try_i64_from_u64},
    domain::shops::data::NewShop,
};

const CREATE_SHOP_SQL: &str = include_str!("sql/create_shop.sql");
const GET_SHOP_SQL: &str = include_str!("sql/get_shop.sql");
const LIST_SHOPS_SQL: &str = include_str!("sql/list_shops.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShopsRepository;

impl PgShopsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_shop(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: NewShop,
    ) -> Result<Shop, sqlx::Error> {
        let prices = shop
            .gift_card_prices
            .iter()
            .map(|price| try_i64_from_u64(*price, "gift_card_prices"))
            .collect::<Result<Vec<i64>, _>>()?;

        query(CREATE_SHOP_SQL)
            .bind(shop.uuid.into_uuid())
            .bind(shop.name)
            .bind(prices)
            .bind(try_i64_from_u64(
                shop.min_gift_card_amount,
                "min_gift_card_amount",
            )?)
            .try_map(|row: PgRow| shop_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_shop(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: ShopUuid,
    ) -> Result<Shop, sqlx::Error> {
        query(GET_SHOP_SQL)
            .bind(shop.into_uuid())
            .try_map(|row: PgRow| shop_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_shops(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Shop>, sqlx::Error> {
        query(LIST_SHOPS_SQL)
            .try_map(|row: PgRow| shop_from_row(&row))
            .fetch_all(&mut **tx)
            .await
    }
}

fn shop_from_row(row: &PgRow) -> sqlx::Result<Shop> {
    let prices: Vec<i64> = row.try_get("gift_card_prices")?;

    let gift_card_prices = prices
        .into_iter()
        .map(|price| {
            u64::try_from(price).map_err(|e| sqlx::Error::ColumnDecode {
                index: "gift_card_prices".to_string(),
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;

    Ok(Shop {
        uuid: ShopUuid::from_uuid(row.try_get("uuid")?),
        name: row.try_get("name")?,
        gift_card_prices,
        min_gift_card_amount: try_get_amount(row, "min_gift_card_amount")?,
    })
}
