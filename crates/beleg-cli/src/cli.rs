//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Beleg - Receipt bookkeeping assistant
#[derive(Parser)]
#[command(name = "beleg")]
#[command(about = "Self-hosted receipt bookkeeping with audit checks and NL queries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "beleg.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BELEG_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Replace all data with generated demo receipts
    Seed {
        /// Number of receipts to generate
        #[arg(short, long, default_value = "50")]
        count: usize,
    },

    /// Extract and ingest a receipt image (requires AI backend)
    Ingest {
        /// Image file to ingest
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Import CORD-style JSON annotations from a directory
    Dataset {
        /// Directory containing .json annotation files
        #[arg(short, long)]
        dir: PathBuf,

        /// Maximum number of annotations to import
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a question about your receipts (German or English)
    Ask {
        /// The question, e.g. "Wie viel habe ich bei Shell ausgegeben?"
        question: String,
    },

    /// Show flagged receipts grouped by audit issue
    Audit,

    /// Show store size and AI backend availability
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
