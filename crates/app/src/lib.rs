//! PostgreSQL persistence, stock and coupon lookups for cartsync.

pub mod carts;
pub mod config;
pub mod context;
pub mod coupons;
pub mod database;
pub mod money;
pub mod observability;
pub mod stock;

mod errors;
