//! Validity Policy

use jiff::{Timestamp, ToSpan, tz::TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Months a card stays valid unless a shop says otherwise.
pub const DEFAULT_VALIDITY_MONTHS: u16 = 12;

/// Errors raised while computing an expiry date.
#[derive(Debug, Error)]
pub enum ValidityError {
    /// The expiry falls outside the supported calendar range.
    #[error("expiry date is out of range")]
    OutOfRange(#[source] jiff::Error),
}

/// How long a purchased card can be redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityPolicy {
    /// Valid for the given number of calendar months from purchase.
    Months(u16),

    /// Never expires.
    Unlimited,
}

impl ValidityPolicy {
    /// Build a policy from a month count, where zero means the card never expires.
    pub const fn from_months(months: u16) -> Self {
        if months == 0 {
            Self::Unlimited
        } else {
            Self::Months(months)
        }
    }

    /// Expiry for a card bought at `purchased_at`, using calendar months in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ValidityError::OutOfRange`] if the expiry cannot be represented.
    pub fn expiry_from(self, purchased_at: Timestamp) -> Result<Option<Timestamp>, ValidityError> {
        match self {
            Self::Unlimited => Ok(None),
            Self::Months(months) => purchased_at
                .to_zoned(TimeZone::UTC)
                .checked_add(i64::from(months).months())
                .map(|expiry| Some(expiry.timestamp()))
                .map_err(ValidityError::OutOfRange),
        }
    }
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self::Months(DEFAULT_VALIDITY_MONTHS)
    }
}
