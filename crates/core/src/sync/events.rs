//! Cart events.
//!
//! Structured outcomes for listeners that turn cart activity into
//! notifications. Publishing never depends on anyone listening.

use std::fmt::{Display, Formatter, Result as FmtResult};

use smallvec::SmallVec;

use crate::{context::UserUuid, products::ProductUuid, stock::StockIssue};

/// Cart operations with an optimistic phase that can be rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    /// Add a product or merge into its line.
    Add,

    /// Set a line's quantity.
    UpdateQuantity,

    /// Remove a line.
    Remove,
}

impl CartOperation {
    /// Stable name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::UpdateQuantity => "update_quantity",
            Self::Remove => "remove",
        }
    }
}

impl Display for CartOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Something observable happened to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart was reloaded from remote persistence.
    Loaded {
        /// Owner.
        user: UserUuid,
        /// Number of lines loaded.
        lines: usize,
    },

    /// A requested load failed; local state was kept.
    LoadFailed {
        /// Owner.
        user: UserUuid,
    },

    /// A product was added or merged and the write acknowledged.
    ItemAdded {
        /// Product added.
        product: ProductUuid,
        /// Committed line quantity.
        quantity: u32,
    },

    /// A line's quantity was changed and the write acknowledged.
    QuantityUpdated {
        /// Product on the line.
        product: ProductUuid,
        /// Committed line quantity.
        quantity: u32,
    },

    /// A line was removed.
    ItemRemoved {
        /// Product removed.
        product: ProductUuid,
    },

    /// Every line and the coupon were dropped.
    Cleared {
        /// Owner.
        user: UserUuid,
    },

    /// A coupon was applied, replacing any previous one.
    CouponApplied {
        /// Normalised code.
        code: String,
    },

    /// The coupon was removed.
    CouponRemoved,

    /// A remote write failed and the optimistic change was undone.
    RolledBack {
        /// Operation that failed.
        operation: CartOperation,
        /// Product on the affected line.
        product: ProductUuid,
    },

    /// A commit succeeded but the reconciling reload did not.
    ReconcileFailed {
        /// Owner.
        user: UserUuid,
    },

    /// Stock verification found lines asking for more than is available.
    StockIssuesDetected {
        /// The offending lines.
        issues: SmallVec<[StockIssue; 4]>,
    },

    /// Local cart state was discarded.
    LoggedOut,
}
