//! Cartsync
//!
//! Shopping cart state with optimistic synchronisation against remote
//! persistence, stock checks on every increase and single-coupon discounts.

pub mod carts;
pub mod context;
pub mod coupons;
pub mod facade;
pub mod products;
pub mod stock;
pub mod sync;
pub mod uuids;

#[cfg(test)]
mod test;

pub use facade::CartFacade;

/// Boxed error carried by collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
