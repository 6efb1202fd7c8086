use clap::{Args, Subcommand};

use super::CliError;

mod check;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Validate a coupon code without applying it to any cart
    Check(check::CheckArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), CliError> {
    match command.command {
        CouponSubcommand::Check(args) => check::run(args).await,
    }
}
