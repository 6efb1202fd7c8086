//! Cart Records

use cartsync::{
    carts::{CartItem, CartItemUuid, CartRow, LineState},
    products::{ProductSnapshot, ProductUuid},
};

/// Cart row joined with its product, as loaded for display.
#[derive(Debug, Clone)]
pub(crate) struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub price: u64,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: u32,
}

impl From<CartItemRecord> for CartItem {
    fn from(record: CartItemRecord) -> Self {
        Self {
            uuid: record.uuid,
            product_uuid: record.product_uuid,
            quantity: record.quantity,
            unit_price: record.price,
            product: ProductSnapshot {
                name: record.name,
                image: record.image,
                category: record.category,
                stock: record.stock,
            },
            state: LineState::Committed,
        }
    }
}

/// Row returned by a cart write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CartRowRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
}

impl From<CartRowRecord> for CartRow {
    fn from(record: CartRowRecord) -> Self {
        Self {
            uuid: record.uuid,
            product_uuid: record.product_uuid,
            quantity: record.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_rows_are_committed_lines() {
        let record = CartItemRecord {
            uuid: CartItemUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity: 2,
            price: 1_250,
            name: "Lampe".to_string(),
            image: None,
            category: Some("Lighting".to_string()),
            stock: 8,
        };

        let item = CartItem::from(record.clone());

        assert_eq!(item.state, LineState::Committed);
        assert_eq!(item.line_total(), 2_500);
        assert_eq!(item.product.name, record.name);
    }
}
