use giftshop::{
    gift_cards::GiftCardUuid,
    redemption::{RedemptionTransaction, TransactionUuid},
    session::UserUuid,
    shops::ShopUuid,
};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};

use crate::database::{try_get_amount, try_i64_from_u64};

const CREATE_TRANSACTION_SQL: &str = include_str!("../sql/create_transaction.sql");
const LIST_TRANSACTIONS_SQL: &str = include_str!("../sql/list_transactions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgTransactionsRepository;

impl PgTransactionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction: &RedemptionTransaction,
    ) -> Result<RedemptionTransaction, sqlx::Error> {
        query(CREATE_TRANSACTION_SQL)
            .bind(transaction.uuid.into_uuid())
            .bind(transaction.gift_card.into_uuid())
            .bind(transaction.shop.into_uuid())
            .bind(transaction.merchant.into_uuid())
            .bind(try_i64_from_u64(transaction.amount_used, "amount_used")?)
            .bind(transaction.description.as_deref())
            .bind(SqlxTimestamp::from(transaction.transaction_date))
            .try_map(|row: PgRow| transaction_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gift_card: GiftCardUuid,
    ) -> Result<Vec<RedemptionTransaction>, sqlx::Error> {
        query(LIST_TRANSACTIONS_SQL)
            .bind(gift_card.into_uuid())
            .try_map(|row: PgRow| transaction_from_row(&row))
            .fetch_all(&mut **tx)
            .await
    }
}

fn transaction_from_row(row: &PgRow) -> sqlx::Result<RedemptionTransaction> {
    Ok(RedemptionTransaction {
        uuid: TransactionUuid::from_uuid(row.try_get("uuid")?),
        gift_card: GiftCardUuid::from_uuid(row.try_get("gift_card_uuid")?),
        shop: ShopUuid::from_uuid(row.try_get("shop_uuid")?),
        merchant: UserUuid::from_uuid(row.try_get("merchant_uuid")?),
        amount_used: try_get_amount(row, "amount_used")?,
        description: row.try_get("description")?,
        transaction_date: row
            .try_get::<SqlxTimestamp, _>("transaction_date")?
            .to_jiff(),
    })
}
