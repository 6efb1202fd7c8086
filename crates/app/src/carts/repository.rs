//! Cart Items Repository

use cartsync::{
    carts::CartItemUuid,
    context::{Locale, UserUuid},
    products::ProductUuid,
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    carts::records::{CartItemRecord, CartRowRecord},
    errors::decode_unsigned,
};

const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_QUANTITY_SQL: &str = include_str!("sql/update_cart_item_quantity.sql");
const GET_PRODUCT_STOCK_SQL: &str = include_str!("sql/get_product_stock.sql");
const GET_CART_ITEM_STOCK_SQL: &str = include_str!("sql/get_cart_item_stock.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("sql/delete_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        locale: &Locale,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .bind(locale.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    /// Returns `None` when the product has too little stock for `quantity`.
    pub(crate) async fn upsert_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<CartRowRecord>, sqlx::Error> {
        query_as::<Postgres, CartRowRecord>(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .bind(encode_quantity(quantity)?)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Returns `None` when the row is missing or the product has too little stock.
    pub(crate) async fn update_cart_item_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<Option<CartRowRecord>, sqlx::Error> {
        query_as::<Postgres, CartRowRecord>(UPDATE_CART_ITEM_QUANTITY_SQL)
            .bind(user.into_uuid())
            .bind(item.into_uuid())
            .bind(encode_quantity(quantity)?)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_product_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u32, sqlx::Error> {
        let stock: i32 = query_scalar(GET_PRODUCT_STOCK_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        decode_unsigned("stock", stock)
    }

    pub(crate) async fn get_cart_item_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<u32, sqlx::Error> {
        let stock: i32 = query_scalar(GET_CART_ITEM_STOCK_SQL)
            .bind(user.into_uuid())
            .bind(item.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        decode_unsigned("stock", stock)
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(item.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn encode_quantity(quantity: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: decode_unsigned("quantity", row.try_get::<i32, _>("quantity")?)?,
            price: decode_unsigned("price", row.try_get::<i64, _>("price")?)?,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            category: row.try_get("category")?,
            stock: decode_unsigned("stock", row.try_get::<i32, _>("stock")?)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartRowRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: decode_unsigned("quantity", row.try_get::<i32, _>("quantity")?)?,
        })
    }
}
