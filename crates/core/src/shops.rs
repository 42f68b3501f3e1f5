//! Shops

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Shop UUID
pub type ShopUuid = TypedUuid<Shop>;

/// A neighbourhood shop selling gift cards, as supplied by the shop catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Shop identifier.
    pub uuid: ShopUuid,

    /// Display name, printed on QR payloads.
    pub name: String,

    /// Fixed gift-card denominations offered by the shop.
    pub gift_card_prices: Vec<u64>,

    /// Smallest custom amount a customer may buy.
    pub min_gift_card_amount: u64,
}
