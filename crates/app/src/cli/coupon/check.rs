use cartsync::coupons::{Coupon, DiscountRule};
use cartsync_app::{
    config::{CartConfig, DatabaseConfig},
    context::AppContext,
    money::format_minor,
};
use clap::Args;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;

use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    cart: CartConfig,

    /// Code to check
    #[arg(long)]
    code: String,
}

pub(crate) async fn run(args: CheckArgs) -> Result<(), CliError> {
    let currency = args.cart.currency()?;
    let app = AppContext::from_database_url(&args.database.database_url).await?;
    let snapshot = app.cart.apply_coupon(&args.code).await?;

    if let Some(coupon) = &snapshot.coupon {
        println!("{}", describe(coupon, currency));
    }

    Ok(())
}

fn describe(coupon: &Coupon, currency: &'static Currency) -> String {
    let rule = match coupon.rule {
        DiscountRule::PercentageOff(percent) => {
            format!("{}% off", ((percent * Decimal::ONE) * Decimal::ONE_HUNDRED).normalize())
        }
        DiscountRule::AmountOff(amount) => format!("{} off", format_minor(amount, currency)),
    };

    let mut description = format!("{}: valid, {rule}", coupon.code);

    if let Some(expires_at) = coupon.expires_at {
        description.push_str(&format!(", expires {expires_at}"));
    }

    if let Some(limit) = coupon.usage_limit {
        let left = limit.saturating_sub(coupon.times_used);

        description.push_str(&format!(", {left} of {limit} uses left"));
    }

    description
}
