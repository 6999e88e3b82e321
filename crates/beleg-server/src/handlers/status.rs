//! Status handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use beleg_core::ai::BackendStatus;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub receipts: i64,
    pub ai_backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_status: Option<BackendStatus>,
}

/// GET /api/status - Store size and AI backend availability
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let receipts = state.db.count_receipts()?;

    let (ai_backend, ai_status) = match &state.ai {
        Some(client) => (Some(client.name()), Some(client.status().await)),
        None => (None, None),
    };

    Ok(Json(StatusResponse {
        receipts,
        ai_backend,
        ai_status,
    }))
}
