//! Redemptions service errors.

use giftshop::{
    redemption::{InvalidReason, RedemptionError},
    session::SessionError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedemptionsServiceError {
    #[error("gift card not found")]
    NotFound,

    #[error("redemption amount must be greater than zero")]
    InvalidAmount,

    #[error("gift card is {0}")]
    Unusable(InvalidReason),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("gift card was issued by another shop")]
    WrongShop,

    #[error("gift card balance changed during redemption")]
    ConcurrencyConflict,

    #[error(transparent)]
    Unauthorized(#[from] SessionError),

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<RedemptionError> for RedemptionsServiceError {
    fn from(error: RedemptionError) -> Self {
        match error {
            RedemptionError::InvalidAmount => Self::InvalidAmount,
            RedemptionError::Unusable(reason) => Self::Unusable(reason),
            RedemptionError::InsufficientBalance {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
        }
    }
}

impl From<Error> for RedemptionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
