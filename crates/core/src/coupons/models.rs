//! Coupon Models

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::coupons::errors::CouponError;

/// How a coupon reduces the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountRule {
    /// Take a fraction of the subtotal off (e.g. 0.10 for "10% off").
    PercentageOff(Percentage),

    /// Take a fixed amount, in minor units, off the subtotal.
    AmountOff(u64),
}

impl DiscountRule {
    /// Percentage rule, rejecting fractions outside `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidRule`] when the percentage is negative or above 100%.
    pub fn percentage_off(percent: Percentage) -> Result<Self, CouponError> {
        let fraction = percent * Decimal::ONE;

        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(CouponError::InvalidRule);
        }

        Ok(Self::PercentageOff(percent))
    }

    /// Discount in minor units for the given subtotal. Never exceeds the subtotal.
    #[must_use]
    pub fn discount_on(&self, subtotal: u64) -> u64 {
        let discount = match self {
            Self::AmountOff(amount) => *amount,
            // Within 0..=100% the product cannot overflow; fall back to no discount if it does.
            Self::PercentageOff(percent) => percent_of_minor(percent, subtotal).unwrap_or(0),
        };

        discount.min(subtotal)
    }
}

/// Apply a percentage to an amount in minor units, rounding half away from zero.
fn percent_of_minor(percent: &Percentage, minor: u64) -> Option<u64> {
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

/// A named discount with expiry and usage constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Normalised (trimmed, upper case) code.
    pub code: String,

    /// Discount applied to the subtotal.
    pub rule: DiscountRule,

    /// Instant after which the coupon is no longer accepted.
    pub expires_at: Option<Timestamp>,

    /// Maximum number of redemptions, if limited.
    pub usage_limit: Option<u32>,

    /// Redemptions so far.
    pub times_used: u32,

    /// Whether the coupon has been switched on.
    pub active: bool,
}

impl Coupon {
    /// Normalise a user-entered code. Returns `None` for blank input.
    #[must_use]
    pub fn normalise_code(code: &str) -> Option<String> {
        let code = code.trim();

        if code.is_empty() {
            return None;
        }

        Some(code.to_uppercase())
    }

    /// Check the coupon can be applied at `now`.
    ///
    /// # Errors
    ///
    /// - [`CouponError::Invalid`] when the coupon is inactive.
    /// - [`CouponError::Expired`] when `expires_at` is at or before `now`.
    /// - [`CouponError::LimitReached`] when every permitted use has been taken.
    pub fn check(&self, now: Timestamp) -> Result<(), CouponError> {
        if !self.active {
            return Err(CouponError::Invalid(self.code.clone()));
        }

        if self.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(CouponError::Expired(self.code.clone()));
        }

        if self
            .usage_limit
            .is_some_and(|limit| self.times_used >= limit)
        {
            return Err(CouponError::LimitReached(self.code.clone()));
        }

        Ok(())
    }

    /// Discount this coupon gives on `subtotal`.
    #[must_use]
    pub fn discount_on(&self, subtotal: u64) -> u64 {
        self.rule.discount_on(subtotal)
    }
}
