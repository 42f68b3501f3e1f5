//! Money

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};

/// Currency every shop in the marketplace trades in.
pub const CURRENCY: &Currency = iso::EUR;

/// Price of `amount` after taking `percent` off, rounded half-up to a whole unit.
///
/// A `percent` of zero leaves the amount untouched and anything above 100 saturates to a free
/// card.
pub fn apply_discount(amount: u64, percent: u8) -> u64 {
    let kept = Decimal::from(100_u8.saturating_sub(percent));

    (Decimal::from(amount) * kept / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        // bounded above by `amount`
        .unwrap_or_default()
}

/// Format a whole-unit amount in the marketplace currency, e.g. `€45.00`.
pub fn display(amount: u64) -> String {
    amount
        .checked_mul(100)
        .and_then(|minor| i64::try_from(minor).ok())
        .map_or_else(
            || format!("{amount} {}", CURRENCY.iso_alpha_code),
            |minor| format!("{}", Money::from_minor(minor, CURRENCY)),
        )
}
