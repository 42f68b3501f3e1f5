//! Gift cards service errors.

use giftshop::{
    gift_cards::{GiftCardCodeError, GiftCardError},
    session::SessionError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GiftCardsServiceError {
    #[error("gift card not found")]
    NotFound,

    #[error("gift card already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Validation(#[from] GiftCardError),

    #[error(transparent)]
    InvalidCode(#[from] GiftCardCodeError),

    #[error(transparent)]
    Unauthorized(#[from] SessionError),

    #[error("could not allocate a unique gift card code")]
    CodeExhausted,

    #[error("gift card has been fully used and cannot be cancelled")]
    NotCancellable,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for GiftCardsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
