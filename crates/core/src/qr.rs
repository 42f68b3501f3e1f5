//! QR Payloads
//!
//! The plain-text payload handed to the QR renderer. Its JSON shape (`code`, `amount`, `shop`,
//! `expires`) is read by existing scanners and must not change.

use serde::{Deserialize, Serialize};

use crate::{gift_cards::GiftCard, shops::Shop};

/// Data encoded into a gift card's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// Formatted gift card code.
    pub code: String,

    /// Face amount in whole euros.
    pub amount: u64,

    /// Issuing shop's name.
    pub shop: String,

    /// Expiry date as `YYYY-MM-DD`, absent for cards that never expire.
    pub expires: Option<String>,
}

impl QrPayload {
    /// Payload for `card` issued by `shop`.
    pub fn new(card: &GiftCard, shop: &Shop) -> Self {
        Self {
            code: card.code.to_string(),
            amount: card.face_amount,
            shop: shop.name.clone(),
            expires: card
                .expires_at
                .map(|expiry| expiry.strftime("%Y-%m-%d").to_string()),
        }
    }

    /// Serialize to the JSON text encoded in the QR image.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
