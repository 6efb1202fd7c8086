//! Coupons

pub mod errors;
pub mod models;
mod validator;

pub use errors::CouponError;
pub use models::{Coupon, DiscountRule};
pub use validator::*;
