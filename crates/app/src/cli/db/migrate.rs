use cartsync_app::{
    config::DatabaseConfig,
    context::AppInitError,
    database::{self, MIGRATOR},
};
use clap::Args;
use tracing::info;

use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct MigrateArgs {
    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: MigrateArgs) -> Result<(), CliError> {
    let pool = database::connect(&args.database.database_url)
        .await
        .map_err(AppInitError::Database)?;

    database::migrate(&pool).await?;

    let migrations = MIGRATOR.iter().count();

    info!(migrations, "database is up to date");

    println!("database is up to date ({migrations} migrations)");

    Ok(())
}
