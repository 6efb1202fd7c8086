//! Stock Records

use cartsync::{
    products::{ProductDetails, ProductSnapshot, ProductUuid},
    stock::StockIssue,
};

/// Catalogue row read for a stock check.
#[derive(Debug, Clone)]
pub(crate) struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl From<ProductRecord> for ProductDetails {
    fn from(record: ProductRecord) -> Self {
        Self {
            uuid: record.uuid,
            price: record.price,
            snapshot: ProductSnapshot {
                name: record.name,
                image: record.image,
                category: record.category,
                stock: record.stock,
            },
        }
    }
}

/// A persisted cart line next to its product's current stock.
#[derive(Debug, Clone)]
pub(crate) struct CartStockRecord {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub quantity: u32,
    pub stock: u32,
}

impl CartStockRecord {
    pub(crate) fn issue(&self) -> Option<StockIssue> {
        StockIssue::detect(self.product_uuid, &self.name, self.quantity, self.stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: u32, stock: u32) -> CartStockRecord {
        CartStockRecord {
            product_uuid: ProductUuid::new(),
            name: "Kettle".to_string(),
            quantity,
            stock,
        }
    }

    #[test]
    fn lines_within_stock_have_no_issue() {
        assert!(record(2, 2).issue().is_none());
    }

    #[test]
    fn lines_beyond_stock_report_what_is_left() {
        let issue = record(3, 1).issue();

        assert_eq!(issue.map(|issue| issue.available_quantity), Some(1));
    }
}
