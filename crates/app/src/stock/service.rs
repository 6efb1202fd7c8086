//! Postgres-backed stock oracle.

use async_trait::async_trait;
use cartsync::{
    context::{Locale, UserUuid},
    products::{ProductDetails, ProductUuid},
    stock::{StockCheck, StockError, StockOracle, StockVerification},
};
use tracing::{Span, field};

use crate::{
    database::Db,
    errors::stock_error,
    stock::{records::CartStockRecord, repository::PgProductsRepository},
};

#[derive(Debug, Clone)]
pub struct PgStockOracle {
    db: Db,
    products_repository: PgProductsRepository,
}

impl PgStockOracle {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            products_repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl StockOracle for PgStockOracle {
    #[tracing::instrument(
        name = "stock.oracle.check_stock",
        skip(self),
        fields(product_uuid = %product, current_stock = field::Empty),
        err
    )]
    async fn check_stock(
        &self,
        product: ProductUuid,
        requested: u32,
    ) -> Result<StockCheck, StockError> {
        let mut tx = self.db.begin().await.map_err(stock_error)?;

        let record = self
            .products_repository
            .get_product(&mut tx, product)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => StockError::ProductNotFound(product),
                error => stock_error(error),
            })?;

        tx.commit().await.map_err(stock_error)?;

        Span::current().record("current_stock", record.stock);

        Ok(StockCheck::evaluate(ProductDetails::from(record), requested))
    }

    #[tracing::instrument(
        name = "stock.oracle.verify_all",
        skip(self),
        fields(user_uuid = %user, issues = field::Empty),
        err
    )]
    async fn verify_all(
        &self,
        user: UserUuid,
        locale: Locale,
    ) -> Result<StockVerification, StockError> {
        let mut tx = self
            .db
            .begin_user_transaction(user)
            .await
            .map_err(stock_error)?;

        let lines = self
            .products_repository
            .get_cart_stock(&mut tx, user, &locale)
            .await
            .map_err(stock_error)?;

        tx.commit().await.map_err(stock_error)?;

        let verification: StockVerification =
            lines.iter().filter_map(CartStockRecord::issue).collect();

        Span::current().record("issues", verification.issues.len());

        Ok(verification)
    }
}
