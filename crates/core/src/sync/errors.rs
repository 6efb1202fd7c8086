//! Cart operation errors.

use thiserror::Error;

use crate::{
    carts::{CartItemUuid, RepositoryError},
    coupons::CouponError,
    products::ProductUuid,
    stock::StockError,
};

/// Typed outcome of a failed cart operation.
///
/// Any optimistic change has already been rolled back by the time one of
/// these is returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation was attempted without a signed-in user.
    #[error("login required")]
    LoginRequired,

    /// The requested quantity exceeds the stock observed at check time.
    #[error("product {product}: {requested} requested, {available} available")]
    StockUnavailable {
        /// Product that ran short.
        product: ProductUuid,

        /// Quantity the line would have had.
        requested: u32,

        /// Stock observed by the check.
        available: u32,
    },

    /// Quantities added to a cart must be at least one.
    #[error("quantity must be at least one")]
    InvalidQuantity,

    /// No line with this row id is in the cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    /// The stock oracle does not know this product.
    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    /// Unknown or inactive coupon code.
    #[error("coupon {0} is not valid")]
    CouponInvalid(String),

    /// The coupon has expired.
    #[error("coupon {0} has expired")]
    CouponExpired(String),

    /// The coupon has no uses left.
    #[error("coupon {0} has reached its usage limit")]
    CouponLimitReached(String),

    /// Stock could not be read; nothing was changed.
    #[error("stock check failed")]
    StockCheckFailed(#[source] StockError),

    /// The coupon store could not be reached; nothing was changed.
    #[error("coupon lookup failed")]
    CouponLookupFailed(#[source] CouponError),

    /// The remote write failed and the local change was rolled back.
    #[error("remote commit failed")]
    RemoteCommitFailed(#[source] RepositoryError),

    /// The cart could not be read; the last known state was kept.
    #[error("cart load failed")]
    CartLoadFailed(#[source] RepositoryError),
}

impl CartError {
    /// Map a validator rejection for `code` onto the cart taxonomy.
    pub(crate) fn from_coupon(code: String, error: CouponError) -> Self {
        match error {
            CouponError::Invalid(_) | CouponError::InvalidRule => Self::CouponInvalid(code),
            CouponError::Expired(_) => Self::CouponExpired(code),
            CouponError::LimitReached(_) => Self::CouponLimitReached(code),
            lookup @ CouponError::Lookup(_) => Self::CouponLookupFailed(lookup),
        }
    }

    /// Whether the failure came from connectivity rather than a business rule.
    ///
    /// The engine never retries on its own; callers may re-issue these.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::StockCheckFailed(_)
                | Self::CouponLookupFailed(_)
                | Self::RemoteCommitFailed(_)
                | Self::CartLoadFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_rejections_keep_the_entered_code() {
        let error = CartError::from_coupon(
            "SAVE10".to_string(),
            CouponError::Expired("save10".to_string()),
        );

        assert!(
            matches!(error, CartError::CouponExpired(ref code) if code == "SAVE10"),
            "expected CouponExpired, got {error:?}"
        );
    }

    #[test]
    fn business_rule_errors_are_not_connectivity() {
        assert!(!CartError::LoginRequired.is_connectivity());
        assert!(CartError::RemoteCommitFailed(RepositoryError::NotFound).is_connectivity());
    }
}
