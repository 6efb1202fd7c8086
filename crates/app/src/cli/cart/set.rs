use cartsync::carts::CartItemUuid;
use clap::Args;

use super::{CartTarget, render::print_cart};
use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct SetArgs {
    #[command(flatten)]
    target: CartTarget,

    /// Cart line to change
    #[arg(long)]
    item: CartItemUuid,

    /// New quantity; zero removes the line
    #[arg(long)]
    quantity: u32,
}

pub(crate) async fn run(args: SetArgs) -> Result<(), CliError> {
    let session = args.target.open().await?;

    session.facade.load(&session.ctx).await?;

    let snapshot = session
        .facade
        .update_quantity(&session.ctx, args.item, args.quantity)
        .await?;

    print_cart(&snapshot, session.currency);

    Ok(())
}
