use clap::Args;
use giftshop::{
    session::{Session, UserUuid},
    shops::ShopUuid,
};
use uuid::Uuid;

/// Who is acting. Normally supplied by the authentication layer in front of this tool.
#[derive(Debug, Args)]
pub(crate) struct SessionArgs {
    /// Acting user UUID
    #[arg(long = "user", env = "GIFTSHOP_USER")]
    user: Option<Uuid>,

    /// Shop the acting user operates, for merchant commands
    #[arg(long = "merchant-of", env = "GIFTSHOP_MERCHANT_OF")]
    merchant_of: Option<Uuid>,
}

impl SessionArgs {
    pub(crate) fn is_present(&self) -> bool {
        self.user.is_some()
    }

    pub(crate) fn session(&self) -> Result<Session, String> {
        let user = self
            .user
            .map(UserUuid::from_uuid)
            .ok_or_else(|| "--user is required for this command".to_string())?;

        Ok(match self.merchant_of {
            Some(shop) => Session::merchant(user, ShopUuid::from_uuid(shop)),
            None => Session::customer(user),
        })
    }

    /// The session together with the shop its merchant operates.
    pub(crate) fn merchant(&self) -> Result<(Session, ShopUuid), String> {
        let session = self.session()?;

        let shop = session
            .shop()
            .ok_or_else(|| "--merchant-of is required for this command".to_string())?;

        Ok((session, shop))
    }
}

#[cfg(test)]
impl SessionArgs {
    pub(crate) fn anonymous() -> Self {
        Self {
            user: None,
            merchant_of: None,
        }
    }

    pub(crate) fn customer() -> Self {
        Self {
            user: Some(Uuid::now_v7()),
            merchant_of: None,
        }
    }

    pub(crate) fn for_merchant(shop: ShopUuid) -> Self {
        Self {
            user: Some(Uuid::now_v7()),
            merchant_of: Some(shop.into_uuid()),
        }
    }
}
