//! Gift Cards Repository

use giftshop::{
    gift_cards::{GiftCard, GiftCardCode, GiftCardStatus, GiftCardUuid, Personalization},
    session::UserUuid,
    shops::ShopUuid,
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query, query_scalar};

use crate::database::{try_get_amount, try_i64_from_u64};

const CODE_EXISTS_SQL: &str = include_str!("sql/code_exists.sql");
const CREATE_GIFT_CARD_SQL: &str = include_str!("sql/create_gift_card.sql");
const FIND_GIFT_CARD_BY_CODE_SQL: &str = include_str!("sql/find_gift_card_by_code.sql");
const GET_GIFT_CARD_SQL: &str = include_str!("sql/get_gift_card.sql");
const LIST_OWNER_GIFT_CARDS_SQL: &str = include_str!("sql/list_owner_gift_cards.sql");
const LIST_SHOP_GIFT_CARDS_SQL: &str = include_str!("sql/list_shop_gift_cards.sql");
const CANCEL_GIFT_CARD_SQL: &str = include_str!("sql/cancel_gift_card.sql");
const EXPIRE_OVERDUE_GIFT_CARDS_SQL: &str = include_str!("sql/expire_overdue_gift_cards.sql");

const COLUMN_FACE_AMOUNT: &str = "face_amount";
const COLUMN_REMAINING_VALUE: &str = "remaining_value";
const COLUMN_STATUS: &str = "status";

#[derive(Debug, Clone, Default)]
pub(crate) struct PgGiftCardsRepository;

impl PgGiftCardsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn code_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &GiftCardCode,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(CODE_EXISTS_SQL)
            .bind(code.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_gift_card(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        card: &GiftCard,
    ) -> Result<GiftCard, sqlx::Error> {
        query(CREATE_GIFT_CARD_SQL)
            .bind(card.uuid.into_uuid())
            .bind(card.code.as_str())
            .bind(card.shop.into_uuid())
            .bind(card.owner.into_uuid())
            .bind(try_i64_from_u64(card.face_amount, COLUMN_FACE_AMOUNT)?)
            .bind(try_i64_from_u64(
                card.remaining_value,
                COLUMN_REMAINING_VALUE,
            )?)
            .bind(card.status.as_str())
            .bind(SqlxTimestamp::from(card.purchased_at))
            .bind(card.expires_at.map(SqlxTimestamp::from))
            .bind(card.personalization.message.as_deref())
            .bind(card.personalization.recipient_name.as_deref())
            .bind(card.personalization.recipient_email.as_deref())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &GiftCardCode,
    ) -> Result<Option<GiftCard>, sqlx::Error> {
        query(FIND_GIFT_CARD_BY_CODE_SQL)
            .bind(code.as_str())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_gift_card(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gift_card: GiftCardUuid,
    ) -> Result<GiftCard, sqlx::Error> {
        query(GET_GIFT_CARD_SQL)
            .bind(gift_card.into_uuid())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_owner_gift_cards(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: UserUuid,
    ) -> Result<Vec<GiftCard>, sqlx::Error> {
        query(LIST_OWNER_GIFT_CARDS_SQL)
            .bind(owner.into_uuid())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_shop_gift_cards(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: ShopUuid,
    ) -> Result<Vec<GiftCard>, sqlx::Error> {
        query(LIST_SHOP_GIFT_CARDS_SQL)
            .bind(shop.into_uuid())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_all(&mut **tx)
            .await
    }

    /// Cancel a card that is still `active` or `expired`. Returns `None` when the stored status
    /// no longer allows it.
    pub(crate) async fn cancel_gift_card(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        gift_card: GiftCardUuid,
    ) -> Result<Option<GiftCard>, sqlx::Error> {
        query(CANCEL_GIFT_CARD_SQL)
            .bind(gift_card.into_uuid())
            .try_map(|row: PgRow| gift_card_from_row(&row))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn expire_overdue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(EXPIRE_OVERDUE_GIFT_CARDS_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn gift_card_from_row(row: &PgRow) -> sqlx::Result<GiftCard> {
    let code: String = row.try_get("code")?;
    let code = GiftCardCode::parse(&code).map_err(|e| sqlx::Error::ColumnDecode {
        index: "code".to_string(),
        source: Box::new(e),
    })?;

    let status: String = row.try_get(COLUMN_STATUS)?;
    let status = status
        .parse::<GiftCardStatus>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: COLUMN_STATUS.to_string(),
            source: Box::new(e),
        })?;

    Ok(GiftCard {
        uuid: GiftCardUuid::from_uuid(row.try_get("uuid")?),
        code,
        shop: ShopUuid::from_uuid(row.try_get("shop_uuid")?),
        owner: UserUuid::from_uuid(row.try_get("owner_uuid")?),
        face_amount: try_get_amount(row, COLUMN_FACE_AMOUNT)?,
        remaining_value: try_get_amount(row, COLUMN_REMAINING_VALUE)?,
        status,
        purchased_at: row.try_get::<SqlxTimestamp, _>("purchased_at")?.to_jiff(),
        expires_at: row
            .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
            .map(SqlxTimestamp::to_jiff),
        personalization: Personalization {
            message: row.try_get("message")?,
            recipient_name: row.try_get("recipient_name")?,
            recipient_email: row.try_get("recipient_email")?,
        },
    })
}
