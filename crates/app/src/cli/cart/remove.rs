use cartsync::carts::CartItemUuid;
use clap::Args;

use super::{CartTarget, render::print_cart};
use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    #[command(flatten)]
    target: CartTarget,

    /// Cart line to remove
    #[arg(long)]
    item: CartItemUuid,
}

pub(crate) async fn run(args: RemoveArgs) -> Result<(), CliError> {
    let session = args.target.open().await?;

    session.facade.load(&session.ctx).await?;

    let snapshot = session.facade.remove_item(&session.ctx, args.item).await?;

    print_cart(&snapshot, session.currency);

    Ok(())
}
