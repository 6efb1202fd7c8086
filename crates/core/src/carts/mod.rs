//! Carts

pub mod models;
mod repository;
pub mod store;
pub mod totals;

pub use models::{CartItem, CartItemUuid, CartRow, LineState};
pub use repository::*;
pub use store::{CartSnapshot, CartStore};
pub use totals::Totals;
