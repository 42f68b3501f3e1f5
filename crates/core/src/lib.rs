//! Giftshop
//!
//! Domain rules for a local-commerce gift-card marketplace: discount pricing, the gift-card
//! ledger and the redemption engine that consumes card balances.

pub mod discounts;
pub mod gift_cards;
pub mod money;
pub mod pricing;
pub mod prelude;
pub mod qr;
pub mod redemption;
pub mod session;
pub mod shops;
pub mod uuids;
