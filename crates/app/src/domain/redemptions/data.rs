//! Redemption Data

use giftshop::redemption::RedemptionTransaction;
use serde::Serialize;

/// Result of a committed redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedemptionOutcome {
    pub remaining_value: u64,
    pub fully_used: bool,
    pub transaction: RedemptionTransaction,
}
