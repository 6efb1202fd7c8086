//! Cart totals.

use crate::{carts::models::CartItem, coupons::Coupon};

/// Derived cart totals in minor units. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of unit price times quantity over every line.
    pub subtotal: u64,

    /// Amount taken off by the applied coupon; zero without one.
    pub discount: u64,

    /// `subtotal - discount`.
    pub total: u64,
}

impl Totals {
    /// Compute totals for a set of lines and an optional coupon.
    pub fn calculate<'a, I>(items: I, coupon: Option<&Coupon>) -> Self
    where
        I: IntoIterator<Item = &'a CartItem>,
    {
        let subtotal = items
            .into_iter()
            .fold(0_u64, |acc, item| acc.saturating_add(item.line_total()));

        let discount = coupon.map_or(0, |coupon| coupon.discount_on(subtotal));

        Self {
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}
