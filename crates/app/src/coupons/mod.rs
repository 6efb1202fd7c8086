//! Coupons

mod records;
mod repository;
mod service;

pub use service::PgCouponValidator;
