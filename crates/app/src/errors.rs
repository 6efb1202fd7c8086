//! Storage error mapping.
//!
//! The core crate knows nothing about sqlx; these translate driver errors
//! into its collaborator error types.

use cartsync::{carts::RepositoryError, coupons::CouponError, stock::StockError};
use sqlx::Error;

pub(crate) fn repository_error(error: Error) -> RepositoryError {
    if matches!(error, Error::RowNotFound) {
        return RepositoryError::NotFound;
    }

    RepositoryError::storage(error)
}

pub(crate) fn stock_error(error: Error) -> StockError {
    StockError::Unavailable(Box::new(error))
}

pub(crate) fn coupon_error(error: Error) -> CouponError {
    CouponError::Lookup(Box::new(error))
}

/// Decode a non-negative integer column into an unsigned type.
pub(crate) fn decode_unsigned<S, U>(index: &str, value: S) -> Result<U, Error>
where
    U: TryFrom<S, Error = std::num::TryFromIntError>,
{
    U::try_from(value).map_err(|e| Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(e),
    })
}
