//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{coupons::records::CouponRecord, errors::decode_unsigned};

const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let amount_off = row
            .try_get::<Option<i64>, _>("amount_off")?
            .map(|amount| decode_unsigned("amount_off", amount))
            .transpose()?;

        let usage_limit = row
            .try_get::<Option<i32>, _>("usage_limit")?
            .map(|limit| decode_unsigned("usage_limit", limit))
            .transpose()?;

        Ok(Self {
            code: row.try_get("code")?,
            percent_off: row.try_get::<Option<Decimal>, _>("percent_off")?,
            amount_off,
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            usage_limit,
            times_used: decode_unsigned("times_used", row.try_get::<i32, _>("times_used")?)?,
            active: row.try_get("active")?,
        })
    }
}
