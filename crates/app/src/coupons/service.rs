//! Postgres-backed coupon validation.

use async_trait::async_trait;
use cartsync::coupons::{Coupon, CouponError, CouponValidator};
use jiff::Timestamp;
use tracing::debug;

use crate::{coupons::repository::PgCouponsRepository, database::Db, errors::coupon_error};

#[derive(Debug, Clone)]
pub struct PgCouponValidator {
    db: Db,
    coupons_repository: PgCouponsRepository,
}

impl PgCouponValidator {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            coupons_repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponValidator for PgCouponValidator {
    #[tracing::instrument(name = "coupon.validator.validate", skip(self), err)]
    async fn validate(&self, code: String) -> Result<Coupon, CouponError> {
        let code = Coupon::normalise_code(&code).ok_or(CouponError::Invalid(code))?;

        let mut tx = self.db.begin().await.map_err(coupon_error)?;

        let record = self
            .coupons_repository
            .get_coupon(&mut tx, &code)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CouponError::Invalid(code.clone()),
                error => coupon_error(error),
            })?;

        tx.commit().await.map_err(coupon_error)?;

        let coupon = Coupon::try_from(record)?;

        coupon.check(Timestamp::now())?;

        debug!(coupon_code = %coupon.code, "coupon accepted");

        Ok(coupon)
    }
}
