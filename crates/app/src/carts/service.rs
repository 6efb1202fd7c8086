//! Postgres-backed cart persistence.

use async_trait::async_trait;
use cartsync::{
    carts::{CartItem, CartItemUuid, CartRepository, CartRow, RepositoryError},
    context::{Locale, UserUuid},
    products::ProductUuid,
};
use tracing::{Span, debug, field};

use crate::{carts::repository::PgCartItemsRepository, database::Db, errors::repository_error};

#[derive(Debug, Clone)]
pub struct PgCartRepository {
    db: Db,
    items_repository: PgCartItemsRepository,
}

impl PgCartRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            items_repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    #[tracing::instrument(
        name = "cart.repository.load_items",
        skip(self),
        fields(user_uuid = %user, rows = field::Empty),
        err
    )]
    async fn load_items(
        &self,
        user: UserUuid,
        locale: Locale,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(repository_error)?;

        let records = self
            .items_repository
            .get_cart_items(&mut tx, user, &locale)
            .await
            .map_err(repository_error)?;

        tx.commit().await.map_err(repository_error)?;

        Span::current().record("rows", records.len());

        Ok(records.into_iter().map(CartItem::from).collect())
    }

    #[tracing::instrument(
        name = "cart.repository.upsert_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn upsert_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartRow, RepositoryError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(repository_error)?;

        let written = self
            .items_repository
            .upsert_cart_item(&mut tx, user, product, quantity)
            .await
            .map_err(repository_error)?;

        let Some(record) = written else {
            let available = self
                .items_repository
                .get_product_stock(&mut tx, product)
                .await
                .map_err(repository_error)?;

            debug!(available, "conditional upsert refused");

            return Err(RepositoryError::InsufficientStock { available });
        };

        tx.commit().await.map_err(repository_error)?;

        Ok(record.into())
    }

    #[tracing::instrument(
        name = "cart.repository.update_quantity",
        skip(self),
        fields(user_uuid = %user, cart_item_uuid = %item),
        err
    )]
    async fn update_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartRow, RepositoryError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(repository_error)?;

        let written = self
            .items_repository
            .update_cart_item_quantity(&mut tx, user, item, quantity)
            .await
            .map_err(repository_error)?;

        let Some(record) = written else {
            // Missing row surfaces as RowNotFound, i.e. NotFound.
            let available = self
                .items_repository
                .get_cart_item_stock(&mut tx, user, item)
                .await
                .map_err(repository_error)?;

            debug!(available, "conditional update refused");

            return Err(RepositoryError::InsufficientStock { available });
        };

        tx.commit().await.map_err(repository_error)?;

        Ok(record.into())
    }

    #[tracing::instrument(
        name = "cart.repository.delete_item",
        skip(self),
        fields(user_uuid = %user, cart_item_uuid = %item),
        err
    )]
    async fn delete_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(repository_error)?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, user, item)
            .await
            .map_err(repository_error)?;

        tx.commit().await.map_err(repository_error)?;

        Ok(rows_affected)
    }

    #[tracing::instrument(
        name = "cart.repository.delete_all",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn delete_all(&self, user: UserUuid) -> Result<u64, RepositoryError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(repository_error)?;

        let rows_affected = self
            .items_repository
            .delete_cart_items(&mut tx, user)
            .await
            .map_err(repository_error)?;

        tx.commit().await.map_err(repository_error)?;

        Ok(rows_affected)
    }
}
