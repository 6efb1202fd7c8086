//! Products Repository

use cartsync::{
    context::{Locale, UserUuid},
    products::ProductUuid,
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    errors::decode_unsigned,
    stock::records::{CartStockRecord, ProductRecord},
};

const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_CART_STOCK_SQL: &str = include_str!("sql/get_cart_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        locale: &Locale,
    ) -> Result<Vec<CartStockRecord>, sqlx::Error> {
        query_as::<Postgres, CartStockRecord>(GET_CART_STOCK_SQL)
            .bind(user.into_uuid())
            .bind(locale.as_str())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: decode_unsigned("price", row.try_get::<i64, _>("price")?)?,
            stock: decode_unsigned("stock", row.try_get::<i32, _>("stock")?)?,
            image: row.try_get("image")?,
            category: row.try_get("category")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartStockRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            quantity: decode_unsigned("quantity", row.try_get::<i32, _>("quantity")?)?,
            stock: decode_unsigned("stock", row.try_get::<i32, _>("stock")?)?,
        })
    }
}
