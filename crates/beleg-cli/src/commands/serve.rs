//! Web server command

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use beleg_core::ai::AIClient;
use beleg_server::{AppState, ServerConfig};

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let ai = AIClient::from_env();
    match &ai {
        Some(client) => println!("🤖 AI backend: {}", client.name()),
        None => println!("💡 AI backend not configured (set OLLAMA_HOST to enable AI features)"),
    }

    let config = ServerConfig::from_env();
    let state = AppState::new(db, ai, config)?;

    println!("🚀 Starting server on http://{}:{}", host, port);
    beleg_server::serve(Arc::new(state), host, port).await
}
