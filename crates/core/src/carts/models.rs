//! Cart Models

use crate::{
    products::{ProductDetails, ProductSnapshot, ProductUuid},
    uuids::TypedUuid,
};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Sync state of a single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Applied locally, waiting for the remote write to resolve.
    Pending,

    /// Acknowledged by remote persistence.
    Committed,
}

/// CartItem Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Cart row identity, unique per user and product.
    pub uuid: CartItemUuid,

    /// Product on this line.
    pub product_uuid: ProductUuid,

    /// Quantity, always at least one.
    pub quantity: u32,

    /// Unit price in minor units at the last sync.
    pub unit_price: u64,

    /// Product fields at the last sync.
    pub product: ProductSnapshot,

    /// Whether the line is confirmed remotely.
    pub state: LineState,
}

impl CartItem {
    /// An optimistic line for a product not yet in the cart.
    ///
    /// The row id is provisional until the remote write returns the real one.
    #[must_use]
    pub fn pending(product: &ProductDetails, quantity: u32) -> Self {
        Self {
            uuid: CartItemUuid::new(),
            product_uuid: product.uuid,
            quantity,
            unit_price: product.price,
            product: product.snapshot.clone(),
            state: LineState::Pending,
        }
    }

    /// Copy of this line with a new quantity, marked pending.
    #[must_use]
    pub fn with_pending_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            state: LineState::Pending,
            ..self.clone()
        }
    }

    /// Price of this line in minor units.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// Cart row as acknowledged by remote persistence after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartRow {
    /// Authoritative row id.
    pub uuid: CartItemUuid,

    /// Product on the row.
    pub product_uuid: ProductUuid,

    /// Persisted quantity.
    pub quantity: u32,
}
