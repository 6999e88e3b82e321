//! Beleg CLI - Receipt bookkeeping assistant
//!
//! Usage:
//!   beleg init                Initialize database
//!   beleg seed --count 50     Seed demo receipts with audit cases
//!   beleg ingest --file IMG   Extract and ingest a receipt image
//!   beleg ask "question"      Ask about your spending (de/en)
//!   beleg serve --port 3000   Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Seed { count } => commands::cmd_seed(&cli.db, count, cli.no_encrypt),
        Commands::Ingest { file } => commands::cmd_ingest(&cli.db, &file, cli.no_encrypt).await,
        Commands::Dataset { dir, limit } => {
            commands::cmd_dataset(&cli.db, &dir, limit, cli.no_encrypt)
        }
        Commands::Ask { question } => commands::cmd_ask(&cli.db, &question, cli.no_encrypt).await,
        Commands::Audit => commands::cmd_audit(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt).await,
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt).await
        }
    }
}
