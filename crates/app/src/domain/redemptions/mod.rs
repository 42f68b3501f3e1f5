//! Redemptions

pub mod data;
pub mod errors;
mod repositories;
pub mod service;

pub use errors::RedemptionsServiceError;
pub use service::*;
