//! Redemption
//!
//! Usability of a card is derived from its stored fields and the current time by
//! [`display_status`]; nothing else in the workspace recomputes it. The only write-back is in
//! [`plan_redemption`], which finalizes the stored status to `used` when a redemption brings the
//! balance to exactly zero.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

use crate::{
    gift_cards::{GiftCard, GiftCardStatus, GiftCardUuid},
    session::UserUuid,
    shops::ShopUuid,
    uuids::TypedUuid,
};

/// Redemption Transaction UUID
pub type TransactionUuid = TypedUuid<RedemptionTransaction>;

/// Usability of a card at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    /// Stored active, balance left and not past expiry.
    Active,

    /// Stored active with nothing left on it.
    Depleted,

    /// Stored active with balance left, but past its expiry date.
    Lapsed,

    /// Stored `used`.
    Used,

    /// Stored `expired`.
    Expired,

    /// Stored `cancelled`.
    Cancelled,
}

impl DisplayStatus {
    /// Whether the card may be redeemed.
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Why the card cannot be redeemed, or `None` when it can.
    pub const fn unusable_reason(self) -> Option<InvalidReason> {
        match self {
            Self::Active => None,
            Self::Depleted | Self::Used => Some(InvalidReason::Depleted),
            Self::Lapsed | Self::Expired => Some(InvalidReason::Expired),
            Self::Cancelled => Some(InvalidReason::Cancelled),
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Depleted => "depleted",
            Self::Lapsed => "lapsed",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Derive the display status of `card` at `now`.
pub fn display_status(card: &GiftCard, now: Timestamp) -> DisplayStatus {
    match card.status {
        GiftCardStatus::Used => DisplayStatus::Used,
        GiftCardStatus::Expired => DisplayStatus::Expired,
        GiftCardStatus::Cancelled => DisplayStatus::Cancelled,
        GiftCardStatus::Active if card.remaining_value == 0 => DisplayStatus::Depleted,
        GiftCardStatus::Active if card.is_past_expiry(now) => DisplayStatus::Lapsed,
        GiftCardStatus::Active => DisplayStatus::Active,
    }
}

/// Why a code failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// No card carries the code.
    NotFound,

    /// The card is past its expiry date.
    Expired,

    /// Nothing is left to redeem.
    Depleted,

    /// The card was cancelled.
    Cancelled,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Expired => "expired",
            Self::Depleted => "depleted",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Outcome of verifying a code before redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The card can be redeemed for up to `max_redeemable`.
    Valid {
        /// The card the code belongs to.
        gift_card: Box<GiftCard>,

        /// Largest amount a single redemption may consume.
        max_redeemable: u64,
    },

    /// The code cannot be redeemed.
    Invalid {
        /// Why the code was rejected.
        error: InvalidReason,
    },
}

/// Serialized as `{ "valid": true, "gift_card": .., "max_redeemable": .. }` or
/// `{ "valid": false, "error": ".." }` for the UI layer.
impl Serialize for Verification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid {
                gift_card,
                max_redeemable,
            } => {
                let mut state = serializer.serialize_struct("Verification", 3)?;
                state.serialize_field("valid", &true)?;
                state.serialize_field("gift_card", gift_card)?;
                state.serialize_field("max_redeemable", max_redeemable)?;
                state.end()
            }
            Self::Invalid { error } => {
                let mut state = serializer.serialize_struct("Verification", 2)?;
                state.serialize_field("valid", &false)?;
                state.serialize_field("error", &error.to_string())?;
                state.end()
            }
        }
    }
}

impl Verification {
    /// Whether the card can be redeemed.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Verify a looked-up card (or its absence) at `now`.
pub fn verify(card: Option<&GiftCard>, now: Timestamp) -> Verification {
    let Some(card) = card else {
        return Verification::Invalid {
            error: InvalidReason::NotFound,
        };
    };

    match display_status(card, now).unusable_reason() {
        Some(error) => Verification::Invalid { error },
        None => Verification::Valid {
            gift_card: Box::new(card.clone()),
            max_redeemable: card.remaining_value,
        },
    }
}

/// Errors that stop a redemption from being applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedemptionError {
    /// Redemptions must consume a positive amount.
    #[error("redemption amount must be greater than zero")]
    InvalidAmount,

    /// The card cannot be redeemed at all.
    #[error("gift card is {0}")]
    Unusable(InvalidReason),

    /// The requested amount exceeds the balance.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount asked for.
        requested: u64,

        /// Balance left on the card.
        available: u64,
    },
}

/// The state a card moves to after a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionPlan {
    /// Balance before the redemption, used as the compare-and-swap guard.
    pub expected_remaining: u64,

    /// Balance after the redemption.
    pub remaining_value: u64,

    /// Stored status to write: `used` once the balance hits zero.
    pub status: GiftCardStatus,
}

impl RedemptionPlan {
    /// Whether the redemption consumes the rest of the card.
    pub const fn fully_used(&self) -> bool {
        self.remaining_value == 0
    }
}

/// Plan redeeming `amount` from `card` at `now`.
///
/// # Errors
///
/// Returns [`RedemptionError::InvalidAmount`] for a zero amount,
/// [`RedemptionError::Unusable`] when the card is not active and
/// [`RedemptionError::InsufficientBalance`] when `amount` exceeds the balance.
pub fn plan_redemption(
    card: &GiftCard,
    amount: u64,
    now: Timestamp,
) -> Result<RedemptionPlan, RedemptionError> {
    if amount == 0 {
        return Err(RedemptionError::InvalidAmount);
    }

    if let Some(reason) = display_status(card, now).unusable_reason() {
        return Err(RedemptionError::Unusable(reason));
    }

    let remaining_value =
        card.remaining_value
            .checked_sub(amount)
            .ok_or(RedemptionError::InsufficientBalance {
                requested: amount,
                available: card.remaining_value,
            })?;

    let status = if remaining_value == 0 {
        GiftCardStatus::Used
    } else {
        card.status
    };

    Ok(RedemptionPlan {
        expected_remaining: card.remaining_value,
        remaining_value,
        status,
    })
}

/// Append-only audit record of a single redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionTransaction {
    /// Transaction UUID.
    pub uuid: TransactionUuid,

    /// Card the value was taken from.
    pub gift_card: GiftCardUuid,

    /// Shop where the card was redeemed, which may differ from the issuer.
    pub shop: ShopUuid,

    /// Merchant user who performed the redemption.
    pub merchant: UserUuid,

    /// Value consumed.
    pub amount_used: u64,

    /// Free-form note entered by the merchant.
    pub description: Option<String>,

    /// When the redemption was applied.
    pub transaction_date: Timestamp,
}

/// Whether shops may redeem cards issued by other shops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionPolicy {
    /// Allow redemption outside the issuing shop.
    pub allow_cross_shop: bool,
}

impl RedemptionPolicy {
    /// Whether `redeeming_shop` may redeem `card`.
    pub fn permits(self, card: &GiftCard, redeeming_shop: ShopUuid) -> bool {
        self.allow_cross_shop || card.shop == redeeming_shop
    }
}
