//! Remote cart persistence contract.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    BoxError,
    carts::models::{CartItem, CartItemUuid, CartRow},
    context::{Locale, UserUuid},
    products::ProductUuid,
};

/// Failures reported by remote cart persistence.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The addressed row does not exist for this user.
    #[error("cart row not found")]
    NotFound,

    /// A conditional write was refused because the product has too little stock.
    #[error("insufficient stock: {available} available")]
    InsufficientStock {
        /// Stock observed by the refused write.
        available: u32,
    },

    /// Transport or storage failure.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

impl RepositoryError {
    /// Wrap any storage error.
    pub fn storage<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Storage(error.into())
    }
}

/// Row-oriented cart store shared by every session of a user.
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All rows for `user`, joined with their product fields.
    async fn load_items(
        &self,
        user: UserUuid,
        locale: Locale,
    ) -> Result<Vec<CartItem>, RepositoryError>;

    /// Set the quantity of the user's row for `product`, inserting the row if absent.
    async fn upsert_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartRow, RepositoryError>;

    /// Set the quantity of an existing row.
    async fn update_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartRow, RepositoryError>;

    /// Delete one row, returning the number of rows removed.
    async fn delete_item(&self, user: UserUuid, item: CartItemUuid)
    -> Result<u64, RepositoryError>;

    /// Delete every row for the user, returning the number of rows removed.
    async fn delete_all(&self, user: UserUuid) -> Result<u64, RepositoryError>;
}
