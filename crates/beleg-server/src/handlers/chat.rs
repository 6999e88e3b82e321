//! Chat query handler

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::{AppError, AppState};
use beleg_core::chat::{answer_question, ChatAnswer};

/// Request body for chat queries
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// POST /api/chat/query - Answer a natural-language question
///
/// The numeric payload in the response is computed deterministically; the
/// prose comes from the AI backend when one is configured, otherwise the
/// calculation block itself is returned.
pub async fn chat_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("query must not be empty"));
    }

    let answer = answer_question(
        &state.db,
        state.ai.as_ref(),
        &state.parser,
        query,
        Utc::now(),
    )
    .await?;

    Ok(Json(answer))
}
