use super::{CartTarget, render::print_cart};
use crate::cli::CliError;

pub(crate) async fn run(target: CartTarget) -> Result<(), CliError> {
    let session = target.open().await?;
    let snapshot = session.facade.clear(&session.ctx).await?;

    print_cart(&snapshot, session.currency);

    Ok(())
}
