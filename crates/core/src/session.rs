//! Session
//!
//! The acting user is supplied by the authentication layer and handed to every operation that
//! mutates state, rather than being read from ambient global state.

use thiserror::Error;

use crate::{shops::ShopUuid, uuids::TypedUuid};

/// Marketplace user (customer or merchant).
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Errors raised when a session lacks the rights an operation needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session does not belong to a merchant.
    #[error("session does not belong to a merchant")]
    NotMerchant,

    /// The merchant does not operate the shop being acted upon.
    #[error("merchant does not operate shop {0}")]
    WrongShop(ShopUuid),
}

/// Authenticated session for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    user: UserUuid,
    merchant_of: Option<ShopUuid>,
}

impl Session {
    /// Session for a customer browsing and purchasing gift cards.
    pub const fn customer(user: UserUuid) -> Self {
        Self {
            user,
            merchant_of: None,
        }
    }

    /// Session for a merchant operating `shop`.
    pub const fn merchant(user: UserUuid, shop: ShopUuid) -> Self {
        Self {
            user,
            merchant_of: Some(shop),
        }
    }

    /// The acting user.
    pub const fn user(&self) -> UserUuid {
        self.user
    }

    /// The shop this session's merchant operates, if any.
    pub const fn shop(&self) -> Option<ShopUuid> {
        self.merchant_of
    }

    /// The merchant id and the shop they operate.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotMerchant`] for customer sessions.
    pub fn merchant_shop(&self) -> Result<(UserUuid, ShopUuid), SessionError> {
        self.merchant_of
            .map(|shop| (self.user, shop))
            .ok_or(SessionError::NotMerchant)
    }

    /// The merchant id, provided they operate `shop`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotMerchant`] for customer sessions and
    /// [`SessionError::WrongShop`] when the merchant operates a different shop.
    pub fn merchant_for(&self, shop: ShopUuid) -> Result<UserUuid, SessionError> {
        let (merchant, operated) = self.merchant_shop()?;

        if operated == shop {
            Ok(merchant)
        } else {
            Err(SessionError::WrongShop(shop))
        }
    }
}
