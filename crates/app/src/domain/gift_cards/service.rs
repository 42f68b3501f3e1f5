//! Gift cards service.

use async_trait::async_trait;
use giftshop::{
    gift_cards::{
        GiftCard, GiftCardCode, GiftCardError, GiftCardStatus, GiftCardSummary, GiftCardUuid,
        ValidityPolicy, summarize,
    },
    pricing::validate_custom_amount,
    qr::QrPayload,
    session::Session,
    shops::{Shop, ShopUuid},
};
use jiff::Timestamp;
use mockall::automock;
use rand::rngs::OsRng;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        gift_cards::{
            data::NewGiftCard, errors::GiftCardsServiceError, repository::PgGiftCardsRepository,
        },
        shops::repository::PgShopsRepository,
    },
};

/// Codes drawn before giving up on finding an unused one.
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct PgGiftCardsService {
    db: Db,
    validity: ValidityPolicy,
    repository: PgGiftCardsRepository,
    shops_repository: PgShopsRepository,
}

impl PgGiftCardsService {
    #[must_use]
    pub fn new(db: Db, validity: ValidityPolicy) -> Self {
        Self {
            db,
            validity,
            repository: PgGiftCardsRepository::new(),
            shops_repository: PgShopsRepository::new(),
        }
    }

    async fn issuing_shop(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        shop: ShopUuid,
    ) -> Result<Shop, GiftCardsServiceError> {
        self.shops_repository
            .get_shop(tx, shop)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => GiftCardsServiceError::InvalidReference,
                error => error.into(),
            })
    }

    async fn unused_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<GiftCardCode, GiftCardsServiceError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = GiftCardCode::generate(&mut OsRng);

            if !self.repository.code_exists(tx, &code).await? {
                return Ok(code);
            }

            warn!(attempt, "generated gift card code already in use");
        }

        Err(GiftCardsServiceError::CodeExhausted)
    }
}

/// Amount actually issued: listed denominations are kept, anything else is raised to the
/// shop minimum.
fn issued_amount(shop: &Shop, requested: u64) -> u64 {
    if shop.gift_card_prices.contains(&requested) {
        requested
    } else {
        validate_custom_amount(shop, requested)
    }
}

#[async_trait]
impl GiftCardsService for PgGiftCardsService {
    #[tracing::instrument(
        name = "gift_cards.service.purchase_gift_card",
        skip(self, session, gift_card),
        fields(
            owner_uuid = %session.user(),
            shop_uuid = %gift_card.shop,
            requested_amount = gift_card.face_amount
        ),
        err
    )]
    async fn purchase_gift_card(
        &self,
        session: Session,
        gift_card: NewGiftCard,
    ) -> Result<GiftCard, GiftCardsServiceError> {
        if gift_card.face_amount == 0 {
            return Err(GiftCardError::ZeroAmount.into());
        }

        let mut tx = self.db.begin().await?;

        let shop = self.issuing_shop(&mut tx, gift_card.shop).await?;
        let face_amount = issued_amount(&shop, gift_card.face_amount);
        let code = self.unused_code(&mut tx).await?;

        let card = GiftCard::purchase(
            GiftCardUuid::new(),
            code,
            shop.uuid,
            session.user(),
            face_amount,
            self.validity,
            gift_card.personalization,
            Timestamp::now(),
        )?;

        let created = self.repository.create_gift_card(&mut tx, &card).await?;

        tx.commit().await?;

        info!(
            gift_card_uuid = %created.uuid,
            face_amount = created.face_amount,
            expires_at = ?created.expires_at,
            "purchased gift card"
        );

        Ok(created)
    }

    async fn get_gift_card(
        &self,
        gift_card: GiftCardUuid,
    ) -> Result<GiftCard, GiftCardsServiceError> {
        let mut tx = self.db.begin().await?;

        let card = self.repository.get_gift_card(&mut tx, gift_card).await?;

        tx.commit().await?;

        Ok(card)
    }

    async fn find_by_code(&self, code: &str) -> Result<GiftCard, GiftCardsServiceError> {
        let code = GiftCardCode::parse(code)?;

        let mut tx = self.db.begin().await?;

        let card = self.repository.find_by_code(&mut tx, &code).await?;

        tx.commit().await?;

        card.ok_or(GiftCardsServiceError::NotFound)
    }

    async fn list_owner_gift_cards(
        &self,
        session: Session,
    ) -> Result<Vec<GiftCard>, GiftCardsServiceError> {
        let mut tx = self.db.begin().await?;

        let cards = self
            .repository
            .list_owner_gift_cards(&mut tx, session.user())
            .await?;

        tx.commit().await?;

        Ok(cards)
    }

    async fn list_shop_gift_cards(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<Vec<GiftCard>, GiftCardsServiceError> {
        session.merchant_for(shop)?;

        let mut tx = self.db.begin().await?;

        let cards = self.repository.list_shop_gift_cards(&mut tx, shop).await?;

        tx.commit().await?;

        Ok(cards)
    }

    async fn shop_summary(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<GiftCardSummary, GiftCardsServiceError> {
        let cards = self.list_shop_gift_cards(session, shop).await?;

        Ok(summarize(&cards, Timestamp::now()))
    }

    #[tracing::instrument(
        name = "gift_cards.service.cancel_gift_card",
        skip(self, session, code),
        fields(merchant_uuid = %session.user()),
        err
    )]
    async fn cancel_gift_card(
        &self,
        session: Session,
        code: &str,
    ) -> Result<GiftCard, GiftCardsServiceError> {
        let code = GiftCardCode::parse(code)?;

        let mut tx = self.db.begin().await?;

        let card = self
            .repository
            .find_by_code(&mut tx, &code)
            .await?
            .ok_or(GiftCardsServiceError::NotFound)?;

        session.merchant_for(card.shop)?;

        if card.status == GiftCardStatus::Cancelled {
            tx.commit().await?;

            return Ok(card);
        }

        let cancelled = self
            .repository
            .cancel_gift_card(&mut tx, card.uuid)
            .await?
            .ok_or(GiftCardsServiceError::NotCancellable)?;

        tx.commit().await?;

        info!(
            gift_card_uuid = %cancelled.uuid,
            forfeited_value = cancelled.remaining_value,
            "cancelled gift card"
        );

        Ok(cancelled)
    }

    #[tracing::instrument(name = "gift_cards.service.expire_overdue", skip(self), err)]
    async fn expire_overdue(&self, now: Timestamp) -> Result<u64, GiftCardsServiceError> {
        let mut tx = self.db.begin().await?;

        let expired = self.repository.expire_overdue(&mut tx, now).await?;

        tx.commit().await?;

        info!(expired, "expired overdue gift cards");

        Ok(expired)
    }

    async fn qr_payload(&self, code: &str) -> Result<QrPayload, GiftCardsServiceError> {
        let code = GiftCardCode::parse(code)?;

        let mut tx = self.db.begin().await?;

        let card = self
            .repository
            .find_by_code(&mut tx, &code)
            .await?
            .ok_or(GiftCardsServiceError::NotFound)?;

        let shop = self.shops_repository.get_shop(&mut tx, card.shop).await?;

        tx.commit().await?;

        Ok(QrPayload::new(&card, &shop))
    }
}

/// Issuing, looking up and administering gift cards.
#[automock]
#[async_trait]
pub trait GiftCardsService: Send + Sync {
    /// Purchase a card owned by the session's user. No payment is captured.
    async fn purchase_gift_card(
        &self,
        session: Session,
        gift_card: NewGiftCard,
    ) -> Result<GiftCard, GiftCardsServiceError>;

    /// Retrieve a single card.
    async fn get_gift_card(&self, gift_card: GiftCardUuid)
    -> Result<GiftCard, GiftCardsServiceError>;

    /// Look a card up by its code, ignoring case and surrounding whitespace.
    async fn find_by_code(&self, code: &str) -> Result<GiftCard, GiftCardsServiceError>;

    /// Cards owned by the session's user, newest first.
    async fn list_owner_gift_cards(
        &self,
        session: Session,
    ) -> Result<Vec<GiftCard>, GiftCardsServiceError>;

    /// Cards sold by a merchant's shop, newest first.
    async fn list_shop_gift_cards(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<Vec<GiftCard>, GiftCardsServiceError>;

    /// Sales totals for a merchant's shop.
    async fn shop_summary(
        &self,
        session: Session,
        shop: ShopUuid,
    ) -> Result<GiftCardSummary, GiftCardsServiceError>;

    /// Cancel a card issued by the merchant's shop. Cancelling twice is a no-op.
    async fn cancel_gift_card(
        &self,
        session: Session,
        code: &str,
    ) -> Result<GiftCard, GiftCardsServiceError>;

    /// Mark active cards past their expiry date as expired, returning how many changed.
    async fn expire_overdue(&self, now: Timestamp) -> Result<u64, GiftCardsServiceError>;

    /// The payload encoded into a card's QR image.
    async fn qr_payload(&self, code: &str) -> Result<QrPayload, GiftCardsServiceError>;
}

#[cfg(test)]
mod tests {
    use giftshop::{
        gift_cards::Personalization,
        session::{SessionError, UserUuid},
    };
    use jiff::{SignedDuration, ToSpan};
    use testresult::TestResult;

    use crate::{domain::redemptions::RedemptionsService, test::TestContext};

    use super::*;

    fn new_gift_card(shop: ShopUuid, face_amount: u64) -> NewGiftCard {
        NewGiftCard {
            shop,
            face_amount,
            personalization: Personalization::default(),
        }
    }

    #[tokio::test]
    async fn purchase_gift_card_issues_full_balance_card() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25, 50, 100], 25).await?;
        let customer = Session::customer(UserUuid::new());

        let card = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;

        assert_eq!(card.shop, shop.uuid);
        assert_eq!(card.owner, customer.user());
        assert_eq!(card.face_amount, 50);
        assert_eq!(card.remaining_value, 50);
        assert_eq!(card.status, GiftCardStatus::Active);
        assert_eq!(card.code.as_str().len(), 14);

        Ok(())
    }

    #[tokio::test]
    async fn purchase_gift_card_sets_twelve_month_expiry() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        let expected = card
            .purchased_at
            .to_zoned(jiff::tz::TimeZone::UTC)
            .checked_add(12.months())?
            .timestamp();

        assert_eq!(card.expires_at, Some(expected));

        Ok(())
    }

    #[tokio::test]
    async fn purchase_gift_card_unlimited_validity_never_expires() -> TestResult {
        let ctx = TestContext::with_validity(ValidityPolicy::Unlimited).await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        assert_eq!(card.expires_at, None);

        Ok(())
    }

    #[tokio::test]
    async fn purchase_gift_card_raises_custom_amount_to_minimum() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25, 50], 25).await?;
        let customer = Session::customer(UserUuid::new());

        let below = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 10))
            .await?;

        let custom = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 70))
            .await?;

        assert_eq!(below.face_amount, 25);
        assert_eq!(custom.face_amount, 70);

        Ok(())
    }

    #[tokio::test]
    async fn purchase_gift_card_zero_amount_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25], 25).await?;

        let result = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 0),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(GiftCardsServiceError::Validation(GiftCardError::ZeroAmount))
            ),
            "expected ZeroAmount, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn purchase_gift_card_unknown_shop_returns_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(ShopUuid::new(), 50),
            )
            .await;

        assert!(
            matches!(result, Err(GiftCardsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn purchase_gift_card_keeps_personalization() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;

        let personalization = Personalization {
            message: Some("Buon compleanno!".to_string()),
            recipient_name: Some("Giulia".to_string()),
            recipient_email: None,
        };

        let created = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                NewGiftCard {
                    shop: shop.uuid,
                    face_amount: 50,
                    personalization: personalization.clone(),
                },
            )
            .await?;

        let stored = ctx.gift_cards.get_gift_card(created.uuid).await?;

        assert_eq!(stored.personalization, personalization);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_code_ignores_case_and_whitespace() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        let entered = format!("  {}  ", card.code.as_str().to_lowercase());

        let found = ctx.gift_cards.find_by_code(&entered).await?;

        assert_eq!(found.uuid, card.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_code_unknown_code_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.gift_cards.find_by_code("ZZZZ-ZZZZ-ZZZZ").await;

        assert!(
            matches!(result, Err(GiftCardsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_owner_gift_cards_only_returns_own_cards() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25, 50], 25).await?;
        let alice = Session::customer(UserUuid::new());
        let bob = Session::customer(UserUuid::new());

        ctx.gift_cards
            .purchase_gift_card(alice, new_gift_card(shop.uuid, 25))
            .await?;
        ctx.gift_cards
            .purchase_gift_card(alice, new_gift_card(shop.uuid, 50))
            .await?;
        ctx.gift_cards
            .purchase_gift_card(bob, new_gift_card(shop.uuid, 50))
            .await?;

        let cards = ctx.gift_cards.list_owner_gift_cards(alice).await?;

        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|card| card.owner == alice.user()));

        Ok(())
    }

    #[tokio::test]
    async fn shop_summary_totals_sales_and_redemptions() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[25, 100], 25).await?;
        let customer = Session::customer(UserUuid::new());

        let redeemed = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 100))
            .await?;
        ctx.gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 25))
            .await?;

        ctx.redemptions
            .redeem(merchant, redeemed.code.as_str(), 40, None)
            .await?;

        let summary = ctx.gift_cards.shop_summary(merchant, shop.uuid).await?;

        assert_eq!(summary.cards_sold, 2);
        assert_eq!(summary.face_value_sold, 125);
        assert_eq!(summary.value_redeemed, 40);
        assert_eq!(summary.outstanding_balance, 85);

        Ok(())
    }

    #[tokio::test]
    async fn shop_summary_leaves_out_lapsed_balances_before_the_sweep() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[50], 25).await?;
        let customer = Session::customer(UserUuid::new());

        let lapsed = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;
        ctx.gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;

        ctx.set_expiry(lapsed.uuid, Timestamp::now() - SignedDuration::from_hours(24))
            .await?;

        let summary = ctx.gift_cards.shop_summary(merchant, shop.uuid).await?;

        assert_eq!(summary.cards_sold, 2, "lapsed cards still count as sold");
        assert_eq!(
            summary.outstanding_balance, 50,
            "lapsed balance is not outstanding"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_shop_gift_cards_requires_the_shops_merchant() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[25], 25).await?;
        let (_other, other_merchant) = ctx.create_shop(&[25], 25).await?;

        let customer_result = ctx
            .gift_cards
            .list_shop_gift_cards(Session::customer(UserUuid::new()), shop.uuid)
            .await;

        let other_result = ctx
            .gift_cards
            .list_shop_gift_cards(other_merchant, shop.uuid)
            .await;

        assert!(
            matches!(
                customer_result,
                Err(GiftCardsServiceError::Unauthorized(SessionError::NotMerchant))
            ),
            "expected NotMerchant, got {customer_result:?}"
        );

        assert!(
            matches!(
                other_result,
                Err(GiftCardsServiceError::Unauthorized(SessionError::WrongShop(_)))
            ),
            "expected WrongShop, got {other_result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_gift_card_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        let cancelled = ctx
            .gift_cards
            .cancel_gift_card(merchant, card.code.as_str())
            .await?;

        let again = ctx
            .gift_cards
            .cancel_gift_card(merchant, card.code.as_str())
            .await?;

        assert_eq!(cancelled.status, GiftCardStatus::Cancelled);
        assert_eq!(cancelled.remaining_value, 50);
        assert_eq!(again.status, GiftCardStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn cancel_gift_card_used_card_is_not_cancellable() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        ctx.redemptions
            .redeem(merchant, card.code.as_str(), 50, None)
            .await?;

        let result = ctx
            .gift_cards
            .cancel_gift_card(merchant, card.code.as_str())
            .await;

        assert!(
            matches!(result, Err(GiftCardsServiceError::NotCancellable)),
            "expected NotCancellable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_gift_card_by_other_merchant_is_unauthorized() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;
        let (_other, other_merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        let result = ctx
            .gift_cards
            .cancel_gift_card(other_merchant, card.code.as_str())
            .await;

        assert!(
            matches!(
                result,
                Err(GiftCardsServiceError::Unauthorized(SessionError::WrongShop(_)))
            ),
            "expected WrongShop, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn expire_overdue_only_touches_lapsed_cards_with_balance() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, merchant) = ctx.create_shop(&[50], 25).await?;
        let customer = Session::customer(UserUuid::new());
        let yesterday = Timestamp::now() - SignedDuration::from_hours(24);

        let lapsed = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;
        let current = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;
        let used = ctx
            .gift_cards
            .purchase_gift_card(customer, new_gift_card(shop.uuid, 50))
            .await?;

        ctx.redemptions
            .redeem(merchant, used.code.as_str(), 50, None)
            .await?;

        ctx.set_expiry(lapsed.uuid, yesterday).await?;
        ctx.set_expiry(used.uuid, yesterday).await?;

        let expired = ctx.gift_cards.expire_overdue(Timestamp::now()).await?;

        assert_eq!(expired, 1);
        assert_eq!(
            ctx.gift_cards.get_gift_card(lapsed.uuid).await?.status,
            GiftCardStatus::Expired
        );
        assert_eq!(
            ctx.gift_cards.get_gift_card(current.uuid).await?.status,
            GiftCardStatus::Active
        );
        assert_eq!(
            ctx.gift_cards.get_gift_card(used.uuid).await?.status,
            GiftCardStatus::Used
        );

        Ok(())
    }

    #[tokio::test]
    async fn qr_payload_names_the_issuing_shop() -> TestResult {
        let ctx = TestContext::new().await;
        let (shop, _merchant) = ctx.create_shop(&[50], 25).await?;

        let card = ctx
            .gift_cards
            .purchase_gift_card(
                Session::customer(UserUuid::new()),
                new_gift_card(shop.uuid, 50),
            )
            .await?;

        let payload = ctx.gift_cards.qr_payload(card.code.as_str()).await?;

        assert_eq!(payload.code, card.code.to_string());
        assert_eq!(payload.amount, 50);
        assert_eq!(payload.shop, shop.name);
        assert!(payload.expires.is_some());

        Ok(())
    }
}
