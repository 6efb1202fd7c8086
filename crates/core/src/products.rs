//! Products
//!
//! The catalogue itself is owned elsewhere; the cart only keeps the product
//! fields it needs to render a line and to reason about stock.

use crate::uuids::TypedUuid;

/// Product marker.
#[derive(Debug)]
pub struct Product;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product fields captured on a cart line at the last sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    /// Display name, localised when a translation exists.
    pub name: String,

    /// Primary image URL.
    pub image: Option<String>,

    /// Category label.
    pub category: Option<String>,

    /// Available stock as last observed.
    pub stock: u32,
}

/// Current catalogue view of a product, as read by the stock oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    /// Product UUID.
    pub uuid: ProductUuid,

    /// Current unit price in minor units.
    pub price: u64,

    /// Name, image, category and current stock.
    pub snapshot: ProductSnapshot,
}
