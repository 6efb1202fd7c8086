//! Cartsync operator CLI

use std::process;

use cartsync_app::{config, observability};
use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() {
    config::load_dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = observability::init(&cli.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{}", error.report());
        process::exit(1);
    }
}
