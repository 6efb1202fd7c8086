use std::error::Error as StdError;

use cartsync::sync::CartError;
use cartsync_app::{
    config::{ConfigError, LoggingConfig},
    context::AppInitError,
};
use clap::{Parser, Subcommand};
use sqlx::migrate::MigrateError;
use thiserror::Error;

mod cart;
mod coupon;
mod db;

#[derive(Debug, Parser)]
#[command(name = "cartsync", about = "Cart sync operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Cart(cart::CartCommand),
    Coupon(coupon::CouponCommand),
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error("failed to run migrations")]
    Migrate(#[from] MigrateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("{0} cart line(s) exceed available stock")]
    StockIssues(usize),
}

impl CliError {
    /// The error and each of its sources, separated by `: `.
    pub(crate) fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();

        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        message
    }
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Cart(command) => cart::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
        }
    }
}
