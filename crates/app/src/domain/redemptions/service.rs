//! Redemptions service.
//!
//! A redemption reads the card, plans the new balance and writes it back guarded by the balance
//! it read. If another redemption got there first the write matches no rows, the transaction is
//! rolled back and the whole read-plan-write cycle runs once more against the fresh balance.

use async_trait::async_trait;
use giftshop::{
    gift_cards::{GiftCardCode, GiftCardUuid},
    redemption::{
        RedemptionPolicy, RedemptionTransaction, TransactionUuid, Verification, plan_redemption,
        verify,
    },
    session::{Session, UserUuid},
    shops::ShopUuid,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        gift_cards::repository::PgGiftCardsRepository,
        redemptions::{
            data::RedemptionOutcome,
            errors::RedemptionsServiceError,
            repositories::{PgBalancesRepository, PgTransactionsRepository},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgRedemptionsService {
    db: Db,
    policy: RedemptionPolicy,
    gift_cards_repository: PgGiftCardsRepository,
    balances_repository: PgBalancesRepository,
    transactions_repository: PgTransactionsRepository,
}

impl PgRedemptionsService {
    #[must_use]
    pub fn new(db: Db, policy: RedemptionPolicy) -> Self {
        Self {
            db,
            policy,
            gift_cards_repository: PgGiftCardsRepository::new(),
            balances_repository: PgBalancesRepository::new(),
            transactions_repository: PgTransactionsRepository::new(),
        }
    }

    async fn try_redeem(
        &self,
        merchant: UserUuid,
        shop: ShopUuid,
        code: &GiftCardCode,
        amount: u64,
        description: Option<String>,
    ) -> Result<RedemptionOutcome, RedemptionsServiceError> {
        let mut tx = self.db.begin().await?;

        let card = self
            .gift_cards_repository
            .find_by_code(&mut tx, code)
            .await?
            .ok_or(RedemptionsServiceError::NotFound)?;

        if !self.policy.permits(&card, shop) {
            return Err(RedemptionsServiceError::WrongShop);
        }

        let now = Timestamp::now();
        let plan = plan_redemption(&card, amount, now)?;

        let updated = self
            .balances_repository
            .apply_redemption(&mut tx, card.uuid, &plan)
            .await?;

        if updated == 0 {
            return Err(RedemptionsServiceError::ConcurrencyConflict);
        }

        let transaction = self
            .transactions_repository
            .create_transaction(
                &mut tx,
                &RedemptionTransaction {
                    uuid: TransactionUuid::new(),
                    gift_card: card.uuid,
                    shop,
                    merchant,
                    amount_used: amount,
                    description,
                    transaction_date: now,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            gift_card_uuid = %card.uuid,
            transaction_uuid = %transaction.uuid,
            amount_used = amount,
            remaining_value = plan.remaining_value,
            fully_used = plan.fully_used(),
            "redeemed gift card"
        );

        Ok(RedemptionOutcome {
            remaining_value: plan.remaining_value,
            fully_used: plan.fully_used(),
            transaction,
        })
    }
}

#[async_trait]
impl RedemptionsService for PgRedemptionsService {
    async fn verify(&self, code: &str) -> Result<Verification, RedemptionsServiceError> {
        let Ok(code) = GiftCardCode::parse(code) else {
            return Ok(verify(None, Timestamp::now()));
        };

        let mut tx = self.db.begin().await?;

        let card = self.gift_cards_repository.find_by_code(&mut tx, &code).await?;

        tx.commit().await?;

        Ok(verify(card.as_ref(), Timestamp::now()))
    }

    #[tracing::instrument(
        name = "redemptions.service.redeem",
        skip(self, session, code, description),
        fields(merchant_uuid = %session.user()),
        err
    )]
    async fn redeem(
        &self,
        session: Session,
        code: &str,
        amount: u64,
        description: Option<String>,
    ) -> Result<RedemptionOutcome, RedemptionsServiceError> {
        let (merchant, shop) = session.merchant_shop()?;
        let code = GiftCardCode::parse(code).map_err(|_| RedemptionsServiceError::NotFound)?;

        match self
            .try_redeem(merchant, shop, &code, amount, description.clone())
            .await
        {
            Err(RedemptionsServiceError::ConcurrencyConflict) => {
                warn!("gift card balance changed concurrently, retrying redemption");

                self.try_redeem(merchant, shop, &code, amount, description)
                    .await
            }
            result => result,
        }
    }

    async fn list_transactions(
        &self,
        gift_card: GiftCardUuid,
    ) -> Result<Vec<RedemptionTransaction>, RedemptionsServiceError> {
        let mut tx = self.db.begin().await?;

        let transactions = self
            .transactions_repository
            .list_transactions(&mut tx, gift_card)
            .await?;

        tx.commit().await?;

        Ok(transactions)
    }
}

/// Verifying and spending gift card balances at the till.
#[automock]
#[async_trait]
pub trait RedemptionsService: Send + Sync {
    /// Report whether a code can be redeemed and for how much. Never changes stored state.
    async fn verify(&self, code: &str) -> Result<Verification, RedemptionsServiceError>;

    /// Spend `amount` from a card at the session merchant's shop.
    async fn redeem(
        &self,
        session: Session,
        code: &str,
        amount: u64,
        description: Option<String>,
    ) -> Result<RedemptionOutcome, RedemptionsServiceError>;

    /// Redemption history of a card, oldest first.
    async fn list_transactions(
        &self,
        gift_card: GiftCardUuid,
    ) -> Result<Vec<RedemptionTransaction>, RedemptionsServiceError>;
}
