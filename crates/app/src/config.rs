//! Configuration
//!
//! Settings come from CLI flags with environment fallbacks; a `.env` file is
//! loaded first when present.

use clap::{Args, ValueEnum};
use rusty_money::{Findable, iso::Currency};
use thiserror::Error;

use cartsync::context::Locale;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Cart presentation settings.
#[derive(Debug, Args)]
pub struct CartConfig {
    /// ISO 4217 currency that prices are stored in
    #[arg(long, env = "CART_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Locale for product names (e.g. en, ar)
    #[arg(long, env = "CART_LOCALE", default_value = "en")]
    pub locale: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown currency {0}")]
    UnknownCurrency(String),
}

impl CartConfig {
    /// Configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] when the code is not an ISO 4217 currency.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Currency::find(&self.currency.trim().to_ascii_uppercase())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Configured locale.
    #[must_use]
    pub fn locale(&self) -> Locale {
        Locale::new(&self.locale)
    }
}

/// Load a `.env` file if one exists.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        cart: CartConfig,

        #[command(flatten)]
        logging: LoggingConfig,
    }

    #[test]
    fn currency_codes_are_case_insensitive() -> TestResult {
        let harness = Harness::try_parse_from(["cartsync", "--currency", "gbp"])?;

        harness.cart.currency()?;

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let harness = Harness::try_parse_from(["cartsync", "--currency", "XXQ"])?;
        let result = harness.cart.currency();

        assert!(
            matches!(result, Err(ConfigError::UnknownCurrency(ref code)) if code == "XXQ"),
            "expected UnknownCurrency, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn locale_flag_is_normalised() -> TestResult {
        let harness = Harness::try_parse_from(["cartsync", "--locale", "AR", "--log-format", "json"])?;

        assert_eq!(harness.cart.locale().as_str(), "ar");
        assert_eq!(harness.logging.log_format, LogFormat::Json);

        Ok(())
    }
}
