//! `fetch-kaggle` entry point.

use std::process;

use clap::Parser;
use fetch_kaggle::logging::setup::init_logging;
use fetch_kaggle_cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.logging_config()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    process::exit(run(cli).await);
}
