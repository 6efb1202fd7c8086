//! Stock Models

use smallvec::SmallVec;

use crate::products::{ProductDetails, ProductUuid};

/// Result of comparing a requested quantity with current stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCheck {
    /// Quantity that was asked for.
    pub requested: u32,

    /// Whether `requested` fits in `current_stock`.
    pub available: bool,

    /// Stock at the time of the read.
    pub current_stock: u32,

    /// Catalogue view of the product at the time of the read.
    pub product: ProductDetails,
}

impl StockCheck {
    /// Evaluate `requested` against the product's current stock.
    #[must_use]
    pub fn evaluate(product: ProductDetails, requested: u32) -> Self {
        let current_stock = product.snapshot.stock;

        Self {
            requested,
            available: requested <= current_stock,
            current_stock,
            product,
        }
    }
}

/// A cart line asking for more than is in stock.
///
/// Display-only; issues are recomputed on every verification and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockIssue {
    /// Product on the offending line.
    pub product_uuid: ProductUuid,

    /// Product name, for display.
    pub product_name: String,

    /// Quantity on the cart line.
    pub requested: u32,

    /// Quantity currently available.
    pub available_quantity: u32,
}

impl StockIssue {
    /// Build an issue when `requested` exceeds `available`.
    #[must_use]
    pub fn detect(
        product_uuid: ProductUuid,
        product_name: &str,
        requested: u32,
        available: u32,
    ) -> Option<Self> {
        (requested > available).then(|| Self {
            product_uuid,
            product_name: product_name.to_string(),
            requested,
            available_quantity: available,
        })
    }
}

/// Outcome of checking a whole cart against stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockVerification {
    /// Lines that ask for more than is available.
    pub issues: SmallVec<[StockIssue; 4]>,
}

impl StockVerification {
    /// True when every line fits in stock.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

impl FromIterator<StockIssue> for StockVerification {
    fn from_iter<I: IntoIterator<Item = StockIssue>>(iter: I) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}
