//! Cart synchronisation
//!
//! Coordinates the local [`CartStore`](crate::carts::CartStore) with remote
//! persistence, stock and coupons.

mod engine;
pub mod errors;
pub mod events;

pub use engine::CartSyncEngine;
pub use errors::CartError;
pub use events::{CartEvent, CartOperation};
