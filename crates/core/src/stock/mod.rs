//! Stock
//!
//! Inventory is owned by the catalogue and shared by every shopper, so any
//! stock figure read here is a point-in-time observation.

pub mod errors;
pub mod models;
mod oracle;

pub use errors::StockError;
pub use models::{StockCheck, StockIssue, StockVerification};
pub use oracle::*;
