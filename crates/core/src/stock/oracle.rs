//! Stock oracle contract.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    context::{Locale, UserUuid},
    products::ProductUuid,
    stock::{
        errors::StockError,
        models::{StockCheck, StockVerification},
    },
};

/// Point-in-time inventory reads.
#[automock]
#[async_trait]
pub trait StockOracle: Send + Sync {
    /// Read current stock for a product and compare it with `requested`.
    ///
    /// Called before any increase of a cart line's quantity.
    async fn check_stock(
        &self,
        product: ProductUuid,
        requested: u32,
    ) -> Result<StockCheck, StockError>;

    /// Compare every line of the user's persisted cart with current stock.
    ///
    /// Called after a cart load and before checkout commits. Issue names are
    /// translated for `locale` like the cart lines they describe.
    async fn verify_all(
        &self,
        user: UserUuid,
        locale: Locale,
    ) -> Result<StockVerification, StockError>;
}
