//! Gift Cards
//!
//! A purchased gift card is the permanent receipt of the purchase: it is created once, its
//! balance only ever goes down, and it is never deleted.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    redemption::{DisplayStatus, display_status},
    session::UserUuid,
    shops::ShopUuid,
    uuids::TypedUuid,
};

pub mod code;
pub mod validity;

pub use code::{GiftCardCode, GiftCardCodeError};
pub use validity::{ValidityError, ValidityPolicy};

/// Gift Card UUID
pub type GiftCardUuid = TypedUuid<GiftCard>;

/// Errors raised while issuing a gift card.
#[derive(Debug, Error)]
pub enum GiftCardError {
    /// Cards must carry a positive face amount.
    #[error("face amount must be greater than zero")]
    ZeroAmount,

    /// The expiry date could not be computed.
    #[error(transparent)]
    Validity(#[from] ValidityError),
}

/// Stored status flag.
///
/// This is only changed by redemption to zero, cancellation and the expiry sweep. Whether a card
/// can be used right now is answered by [`crate::redemption::display_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftCardStatus {
    /// Issued and not yet finalized.
    Active,

    /// Redeemed down to a zero balance.
    Used,

    /// Swept after its expiry date.
    Expired,

    /// Administratively cancelled.
    Cancelled,
}

impl GiftCardStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GiftCardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised stored status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown gift card status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for GiftCardStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Optional personal touches added by the purchasing customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Message printed with the card.
    pub message: Option<String>,

    /// Name of the person receiving the card.
    pub recipient_name: Option<String>,

    /// Where the card should be sent.
    pub recipient_email: Option<String>,
}

/// A purchased, redeemable gift card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCard {
    /// Gift card UUID.
    pub uuid: GiftCardUuid,

    /// Code printed on the card and entered at redemption.
    pub code: GiftCardCode,

    /// Issuing shop.
    pub shop: ShopUuid,

    /// Customer who bought the card.
    pub owner: UserUuid,

    /// Value at purchase, in whole euros.
    pub face_amount: u64,

    /// Value still redeemable.
    pub remaining_value: u64,

    /// Stored lifecycle status.
    pub status: GiftCardStatus,

    /// Purchase time.
    pub purchased_at: Timestamp,

    /// Expiry time, `None` for cards that never expire.
    pub expires_at: Option<Timestamp>,

    /// Message and recipient details.
    pub personalization: Personalization,
}

impl GiftCard {
    /// Issue a new card: full balance, active, expiring per `validity`.
    ///
    /// # Errors
    ///
    /// Returns [`GiftCardError::ZeroAmount`] for a zero face amount and
    /// [`GiftCardError::Validity`] if the expiry cannot be computed.
    #[expect(
        clippy::too_many_arguments,
        reason = "every field of a fresh card is caller supplied"
    )]
    pub fn purchase(
        uuid: GiftCardUuid,
        code: GiftCardCode,
        shop: ShopUuid,
        owner: UserUuid,
        face_amount: u64,
        validity: ValidityPolicy,
        personalization: Personalization,
        purchased_at: Timestamp,
    ) -> Result<Self, GiftCardError> {
        if face_amount == 0 {
            return Err(GiftCardError::ZeroAmount);
        }

        Ok(Self {
            uuid,
            code,
            shop,
            owner,
            face_amount,
            remaining_value: face_amount,
            status: GiftCardStatus::Active,
            purchased_at,
            expires_at: validity.expiry_from(purchased_at)?,
            personalization,
        })
    }

    /// Value consumed by redemptions so far.
    pub const fn redeemed_value(&self) -> u64 {
        self.face_amount.saturating_sub(self.remaining_value)
    }

    /// Whether `now` is at or past the expiry date.
    pub fn is_past_expiry(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }
}

/// Sales totals for a shop's gift cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCardSummary {
    /// Number of cards sold.
    pub cards_sold: u64,

    /// Sum of face amounts sold.
    pub face_value_sold: u64,

    /// Sum of value already redeemed.
    pub value_redeemed: u64,

    /// Balance still redeemable at the time of the summary.
    pub outstanding_balance: u64,
}

/// Summarize a shop's cards for the merchant dashboard as of `now`.
///
/// Cards past their expiry count as lapsed even before the expiry sweep persists it.
pub fn summarize<'a, I>(cards: I, now: Timestamp) -> GiftCardSummary
where
    I: IntoIterator<Item = &'a GiftCard>,
{
    cards
        .into_iter()
        .fold(GiftCardSummary::default(), |summary, card| GiftCardSummary {
            cards_sold: summary.cards_sold.saturating_add(1),
            face_value_sold: summary.face_value_sold.saturating_add(card.face_amount),
            value_redeemed: summary
                .value_redeemed
                .saturating_add(card.redeemed_value()),
            outstanding_balance: if display_status(card, now) == DisplayStatus::Active {
                summary
                    .outstanding_balance
                    .saturating_add(card.remaining_value)
            } else {
                summary.outstanding_balance
            },
        })
}
