//! Gift Card Data

use giftshop::{gift_cards::Personalization, shops::ShopUuid};

/// New Gift Card Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGiftCard {
    pub shop: ShopUuid,

    /// Requested face amount. Amounts outside the shop's price list are raised to its minimum.
    pub face_amount: u64,
    pub personalization: Personalization,
}
