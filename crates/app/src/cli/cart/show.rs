use clap::Args;

use super::{CartTarget, render::print_cart};
use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    target: CartTarget,

    /// Preview totals with this coupon applied
    #[arg(long)]
    coupon: Option<String>,
}

pub(crate) async fn run(args: ShowArgs) -> Result<(), CliError> {
    let session = args.target.open().await?;
    let mut snapshot = session.facade.load(&session.ctx).await?;

    if let Some(code) = args.coupon {
        snapshot = session.facade.apply_coupon(&code).await?;
    }

    print_cart(&snapshot, session.currency);

    Ok(())
}
