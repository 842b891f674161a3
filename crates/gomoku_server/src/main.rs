//! Gomoku Server - command-line entry point.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use gomoku_server::{Cli, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            init_tracing();
            let config = args.resolve()?;
            info!(port = config.port(), "Starting gomoku server");
            gomoku_server::serve(config).await
        }
        Command::Config(args) => {
            let config = args.resolve()?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gomoku_server=debug")),
        )
        .init();
}
