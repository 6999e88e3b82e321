//! Question answering command

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use beleg_core::ai::AIClient;
use beleg_core::chat::answer_question;
use beleg_core::query::QueryParser;

use super::open_db;

pub async fn cmd_ask(db_path: &Path, question: &str, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let parser = QueryParser::new()?;

    let ai = AIClient::from_env();
    if ai.is_none() {
        println!("💡 No AI backend configured - returning the numeric digest directly");
    }

    let answer = answer_question(&db, ai.as_ref(), &parser, question, Utc::now()).await?;

    println!();
    println!("Filter: {}", answer.filter);
    println!(
        "Matched {} receipts, total {:.2}€",
        answer.stats.count, answer.stats.total
    );
    println!();
    println!("{}", answer.answer);

    Ok(())
}
