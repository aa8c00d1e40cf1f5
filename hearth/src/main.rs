//! hearth - Hearth CLI
//!
//! Talks to hearth-server over HTTP: pile values, task and review
//! completions, the leaderboard and a status view.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("hearth=warn".parse()?))
        .init();

    let cli = Cli::parse();
    let client = api::ApiClient::new(cli.server.clone());

    match cli.command {
        Commands::Pile(cmd) => commands::pile::execute(cmd, &client).await,
        Commands::Task(cmd) => commands::task::execute(cmd, &client).await,
        Commands::Review(cmd) => commands::review::execute(cmd, &client).await,
        Commands::Leaderboard => commands::leaderboard::execute(&client).await,
        Commands::Status => commands::status::execute(&client).await,
        Commands::Version => {
            println!("hearth {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
