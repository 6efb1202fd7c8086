//! Money formatting

use rusty_money::{Money, iso::Currency};

/// Render an amount in minor units, e.g. `4500` in USD as `$45.00`.
pub fn format_minor(amount: u64, currency: &'static Currency) -> String {
    let minor = i64::try_from(amount).unwrap_or(i64::MAX);

    Money::from_minor(minor, currency).to_string()
}
