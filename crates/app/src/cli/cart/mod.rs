use cartsync::{
    context::{CartContext, UserUuid},
    facade::CartFacade,
};
use cartsync_app::{
    config::{CartConfig, DatabaseConfig},
    context::AppContext,
};
use clap::{Args, Subcommand};
use rusty_money::iso::Currency;

use super::CliError;

mod add;
mod clear;
mod remove;
mod render;
mod set;
mod show;
mod verify;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart with totals
    Show(show::ShowArgs),

    /// Add a product, merging into its line
    Add(add::AddArgs),

    /// Set a line's quantity; zero removes it
    Set(set::SetArgs),

    /// Remove a line
    Remove(remove::RemoveArgs),

    /// Remove every line
    Clear(CartTarget),

    /// Check every line against current stock
    Verify(CartTarget),
}

/// Whose cart, and where it lives.
#[derive(Debug, Args)]
pub(crate) struct CartTarget {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    cart: CartConfig,

    /// Cart owner
    #[arg(long)]
    user: UserUuid,
}

/// A connected cart session for one user.
pub(crate) struct Session {
    pub facade: CartFacade,
    pub ctx: CartContext,
    pub currency: &'static Currency,
}

impl CartTarget {
    pub(crate) async fn open(self) -> Result<Session, CliError> {
        let currency = self.cart.currency()?;
        let app = AppContext::from_database_url(&self.database.database_url).await?;
        let ctx = CartContext::authenticated(self.user, self.cart.locale());

        Ok(Session {
            facade: app.cart,
            ctx,
            currency,
        })
    }
}

pub(crate) async fn run(command: CartCommand) -> Result<(), CliError> {
    match command.command {
        CartSubcommand::Show(args) => show::run(args).await,
        CartSubcommand::Add(args) => add::run(args).await,
        CartSubcommand::Set(args) => set::run(args).await,
        CartSubcommand::Remove(args) => remove::run(args).await,
        CartSubcommand::Clear(target) => clear::run(target).await,
        CartSubcommand::Verify(target) => verify::run(target).await,
    }
}
