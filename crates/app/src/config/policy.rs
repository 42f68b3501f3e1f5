//! Gift Card Policy Config

use clap::Args;
use giftshop::{
    gift_cards::{ValidityPolicy, validity::DEFAULT_VALIDITY_MONTHS},
    redemption::RedemptionPolicy,
};

/// Business rules applied when issuing and redeeming gift cards.
#[derive(Debug, Clone, Copy, Args)]
pub struct PolicyConfig {
    /// Months a new gift card stays valid; 0 issues cards that never expire
    #[arg(
        long,
        env = "GIFT_CARD_VALIDITY_MONTHS",
        default_value_t = DEFAULT_VALIDITY_MONTHS,
        global = true
    )]
    pub gift_card_validity_months: u16,

    /// Let merchants redeem gift cards issued by other shops
    #[arg(
        long,
        env = "ALLOW_CROSS_SHOP_REDEMPTION",
        default_value_t = false,
        global = true
    )]
    pub allow_cross_shop_redemption: bool,
}

impl PolicyConfig {
    #[must_use]
    pub const fn validity(&self) -> ValidityPolicy {
        ValidityPolicy::from_months(self.gift_card_validity_months)
    }

    #[must_use]
    pub const fn redemption(&self) -> RedemptionPolicy {
        RedemptionPolicy {
            allow_cross_shop: self.allow_cross_shop_redemption,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            gift_card_validity_months: DEFAULT_VALIDITY_MONTHS,
            allow_cross_shop_redemption: false,
        }
    }
}
