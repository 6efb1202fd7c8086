use super::CartTarget;
use crate::cli::CliError;

pub(crate) async fn run(target: CartTarget) -> Result<(), CliError> {
    let session = target.open().await?;
    let verification = session.facade.verify_for_checkout(&session.ctx).await?;

    if verification.is_ok() {
        println!("every line is in stock");

        return Ok(());
    }

    for issue in &verification.issues {
        println!(
            "{}: {} requested, {} available",
            issue.product_name, issue.requested, issue.available_quantity
        );
    }

    Err(CliError::StockIssues(verification.issues.len()))
}
