use cartsync::products::ProductUuid;
use clap::Args;

use super::{CartTarget, render::print_cart};
use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    target: CartTarget,

    /// Product to add
    #[arg(long)]
    product: ProductUuid,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

pub(crate) async fn run(args: AddArgs) -> Result<(), CliError> {
    let session = args.target.open().await?;

    session.facade.load(&session.ctx).await?;

    let snapshot = session
        .facade
        .add_item(&session.ctx, args.product, args.quantity)
        .await?;

    print_cart(&snapshot, session.currency);

    Ok(())
}
