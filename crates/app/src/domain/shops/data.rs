//! Shop Data

use giftshop::shops::ShopUuid;

/// New Shop Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShop {
    pub uuid: ShopUuid,
    pub name: String,
    pub gift_card_prices: Vec<u64>,
    pub min_gift_card_amount: u64,
}
