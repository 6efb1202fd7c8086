//! Stock

mod records;
mod repository;
mod service;

pub use service::PgStockOracle;
