//! Carts

mod records;
mod repository;
mod service;

pub use service::PgCartRepository;
