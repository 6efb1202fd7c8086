//! Test support: an in-memory backend and fixtures.


pub(crate) use memory::MemoryBackend;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    context::{CartContext, Locale, UserUuid},
    coupons::{Coupon, DiscountRule},
};

pub(crate) fn signed_in() -> CartContext {
    CartContext::authenticated(UserUuid::new(), Locale::default())
}

pub(crate) fn signed_out() -> CartContext {
    CartContext::anonymous(Locale::default())
}

/// `SAVE10`: ten percent off, no expiry, unlimited uses.
pub(crate) fn save10() -> Coupon {
    Coupon {
        code: "SAVE10".to_string(),
        rule: DiscountRule::PercentageOff(Percentage::from(Decimal::new(10, 2))),
        expires_at: None,
        usage_limit: None,
        times_used: 0,
        active: true,
    }
}
