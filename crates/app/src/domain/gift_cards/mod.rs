//! Gift Cards

pub mod data;
pub mod errors;
pub(crate) mod repository;
pub mod service;

pub use errors::GiftCardsServiceError;
pub use service::*;
