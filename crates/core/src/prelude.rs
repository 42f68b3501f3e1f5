//! Giftshop prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    discounts::{
        DiscountPercentage, DiscountRule, DiscountRuleError, DiscountUuid, NewDiscountRule,
        active_rules,
    },
    gift_cards::{
        GiftCard, GiftCardCode, GiftCardCodeError, GiftCardError, GiftCardStatus,
        GiftCardSummary, GiftCardUuid, Personalization, ValidityPolicy, summarize,
    },
    money::{apply_discount, display},
    pricing::{PricingOption, calculate_gift_card_amounts, resolve_options, validate_custom_amount},
    qr::QrPayload,
    redemption::{
        DisplayStatus, InvalidReason, RedemptionError, RedemptionPlan, RedemptionPolicy,
        RedemptionTransaction, TransactionUuid, Verification, display_status, plan_redemption,
        verify,
    },
    session::{Session, SessionError, UserUuid},
    shops::{Shop, ShopUuid},
};
