//! Coupon Records

use cartsync::coupons::{Coupon, CouponError, DiscountRule};
use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;

/// Coupon row as stored. Exactly one of `percent_off` and `amount_off` is set.
#[derive(Debug, Clone)]
pub(crate) struct CouponRecord {
    pub code: String,
    pub percent_off: Option<Decimal>,
    pub amount_off: Option<u64>,
    pub expires_at: Option<Timestamp>,
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub active: bool,
}

impl TryFrom<CouponRecord> for Coupon {
    type Error = CouponError;

    fn try_from(record: CouponRecord) -> Result<Self, Self::Error> {
        let rule = match (record.percent_off, record.amount_off) {
            (Some(percent), None) => DiscountRule::percentage_off(Percentage::from(percent))?,
            (None, Some(amount)) => DiscountRule::AmountOff(amount),
            _ => return Err(CouponError::InvalidRule),
        };

        Ok(Self {
            code: record.code,
            rule,
            expires_at: record.expires_at,
            usage_limit: record.usage_limit,
            times_used: record.times_used,
            active: record.active,
        })
    }
}
