//! Coupon errors.

use thiserror::Error;

use crate::BoxError;

/// Reasons a coupon cannot be applied.
#[derive(Debug, Error)]
pub enum CouponError {
    /// Unknown or inactive code.
    #[error("coupon {0} is not valid")]
    Invalid(String),

    /// The coupon's expiry has passed.
    #[error("coupon {0} has expired")]
    Expired(String),

    /// Every permitted use has been taken.
    #[error("coupon {0} has reached its usage limit")]
    LimitReached(String),

    /// The stored discount rule is outside its allowed range.
    #[error("discount rule is out of range")]
    InvalidRule,

    /// The coupon store could not be reached.
    #[error("coupon lookup failed")]
    Lookup(#[source] BoxError),
}
