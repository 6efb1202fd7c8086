//! Coupon validation contract.

use async_trait::async_trait;
use mockall::automock;

use crate::coupons::{errors::CouponError, models::Coupon};

/// Coupon lookup and rule checks.
#[automock]
#[async_trait]
pub trait CouponValidator: Send + Sync {
    /// Look up `code` and check it against its expiry and usage rules.
    ///
    /// Implementations receive the code as entered; use [`Coupon::normalise_code`]
    /// to match it.
    async fn validate(&self, code: String) -> Result<Coupon, CouponError>;
}
