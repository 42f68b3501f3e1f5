//! Pricing
//!
//! Turns a shop's denominations and its active discount rules into the options a customer can
//! pick from.

use serde::{Deserialize, Serialize};

use crate::{discounts::DiscountRule, shops::Shop};

/// A purchasable gift-card option. Derived on every query, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOption {
    /// Face value the customer receives.
    pub amount: u64,

    /// Price without any discount.
    pub original_price: u64,

    /// Price charged under a discount rule.
    pub discounted_price: Option<u64>,

    /// Percentage taken off, when discounted.
    pub discount_percentage: Option<u8>,

    /// Whether this is the discounted variant.
    pub is_discounted: bool,
}

impl PricingOption {
    /// Option sold at face value.
    pub const fn regular(amount: u64) -> Self {
        Self {
            amount,
            original_price: amount,
            discounted_price: None,
            discount_percentage: None,
            is_discounted: false,
        }
    }

    /// Option discounted by `rule`.
    pub fn discounted(rule: &DiscountRule) -> Self {
        Self {
            amount: rule.gift_card_amount,
            original_price: rule.gift_card_amount,
            discounted_price: Some(rule.discounted_price()),
            discount_percentage: Some(rule.percentage.get()),
            is_discounted: true,
        }
    }

    /// What the customer pays for this option.
    pub fn price(&self) -> u64 {
        self.discounted_price.unwrap_or(self.original_price)
    }
}

/// Every option a customer can buy from `shop`, ascending by original price.
///
/// Each denomination appears as a regular option and each active rule adds a discounted option
/// for its amount, so a face amount can appear twice. For equal prices the regular option comes
/// first. Inactive rules are skipped.
pub fn resolve_options(shop: &Shop, rules: &[DiscountRule]) -> Vec<PricingOption> {
    let mut options: Vec<PricingOption> = shop
        .gift_card_prices
        .iter()
        .copied()
        .map(PricingOption::regular)
        .chain(
            rules
                .iter()
                .filter(|rule| rule.is_active && rule.shop == shop.uuid)
                .map(PricingOption::discounted),
        )
        .collect();

    options.sort_by_key(|option| (option.original_price, option.is_discounted));

    options
}

/// Raise a customer-entered custom amount to the shop's minimum.
///
/// Amounts below the minimum are clamped rather than rejected.
pub fn validate_custom_amount(shop: &Shop, requested: u64) -> u64 {
    requested.max(shop.min_gift_card_amount)
}

/// The three canonical display tiers for a minimum amount: single, double and quadruple.
pub const fn calculate_gift_card_amounts(minimum: u64) -> [u64; 3] {
    [
        minimum,
        minimum.saturating_mul(2),
        minimum.saturating_mul(4),
    ]
}
