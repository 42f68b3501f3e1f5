//! Giftshop Domain Concerns

pub mod discounts;
pub mod gift_cards;
pub mod pricing;
pub mod redemptions;
pub mod shops;
