//! Stock errors.

use thiserror::Error;

use crate::{BoxError, products::ProductUuid};

/// Failures while reading inventory.
#[derive(Debug, Error)]
pub enum StockError {
    /// No product exists with this UUID.
    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    /// The inventory store could not be reached.
    #[error("stock lookup failed")]
    Unavailable(#[source] BoxError),
}
