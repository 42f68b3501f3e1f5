//! Discounts
//!
//! Merchant-configured percentage markdowns, each bound to one gift-card face amount of a shop.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{money::apply_discount, shops::ShopUuid, uuids::TypedUuid};

/// Smallest percentage a rule may take off.
pub const MIN_DISCOUNT_PERCENTAGE: u8 = 1;

/// Largest percentage a rule may take off.
pub const MAX_DISCOUNT_PERCENTAGE: u8 = 99;

/// Discount Rule UUID
pub type DiscountUuid = TypedUuid<DiscountRule>;

/// Errors raised while validating discount rule input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountRuleError {
    /// The targeted face amount must be positive.
    #[error("gift card amount must be greater than zero")]
    ZeroAmount,

    /// The percentage is outside the accepted range.
    #[error(
        "discount percentage {0} is outside {MIN_DISCOUNT_PERCENTAGE}-{MAX_DISCOUNT_PERCENTAGE}"
    )]
    PercentageOutOfRange(i64),
}

/// A discount percentage between 1 and 99 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DiscountPercentage(u8);

impl DiscountPercentage {
    /// Validate a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountRuleError::PercentageOutOfRange`] outside `1..=99`.
    pub fn new(percentage: i64) -> Result<Self, DiscountRuleError> {
        u8::try_from(percentage)
            .ok()
            .filter(|p| (MIN_DISCOUNT_PERCENTAGE..=MAX_DISCOUNT_PERCENTAGE).contains(p))
            .map(Self)
            .ok_or(DiscountRuleError::PercentageOutOfRange(percentage))
    }

    /// The raw percentage.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for DiscountPercentage {
    type Error = DiscountRuleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercentage> for u8 {
    fn from(value: DiscountPercentage) -> Self {
        value.0
    }
}

impl fmt::Display for DiscountPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Validated input for a new discount rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewDiscountRule {
    /// Owning shop.
    pub shop: ShopUuid,

    /// Face amount the rule discounts.
    pub gift_card_amount: u64,

    /// Percentage taken off the face amount.
    pub percentage: DiscountPercentage,
}

impl NewDiscountRule {
    /// Validate raw merchant input.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountRuleError::ZeroAmount`] for a zero face amount and
    /// [`DiscountRuleError::PercentageOutOfRange`] for a percentage outside `1..=99`.
    pub fn new(
        shop: ShopUuid,
        gift_card_amount: u64,
        percentage: i64,
    ) -> Result<Self, DiscountRuleError> {
        if gift_card_amount == 0 {
            return Err(DiscountRuleError::ZeroAmount);
        }

        Ok(Self {
            shop,
            gift_card_amount,
            percentage: DiscountPercentage::new(percentage)?,
        })
    }
}

/// A stored discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Rule identifier.
    pub uuid: DiscountUuid,

    /// Owning shop.
    pub shop: ShopUuid,

    /// Face amount the rule discounts.
    pub gift_card_amount: u64,

    /// Percentage taken off the face amount.
    pub percentage: DiscountPercentage,

    /// Whether customers are currently offered the discount.
    pub is_active: bool,

    /// Creation timestamp.
    pub created_at: Timestamp,
}

impl DiscountRule {
    /// Price a customer pays for a card of `gift_card_amount` under this rule.
    pub fn discounted_price(&self) -> u64 {
        apply_discount(self.gift_card_amount, self.percentage.get())
    }
}

/// Active rules only, ascending by face amount.
pub fn active_rules(rules: &[DiscountRule]) -> Vec<DiscountRule> {
    let mut active: Vec<DiscountRule> = rules.iter().filter(|r| r.is_active).cloned().collect();

    active.sort_by_key(|rule| rule.gift_card_amount);

    active
}
