//! App Context

use std::sync::Arc;

use cartsync::CartFacade;
use thiserror::Error;

use crate::{
    carts::PgCartRepository,
    coupons::PgCouponValidator,
    database::{self, Db},
    stock::PgStockOracle,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: Db,
    pub cart: CartFacade,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool)))
    }

    /// Wire the Postgres collaborators into a cart facade.
    #[must_use]
    pub fn from_db(db: Db) -> Self {
        let cart = CartFacade::new(
            Arc::new(PgCartRepository::new(db.clone())),
            Arc::new(PgStockOracle::new(db.clone())),
            Arc::new(PgCouponValidator::new(db.clone())),
        );

        Self { db, cart }
    }
}
