//! Analytics handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use beleg_core::db::{CategoryTotal, MonthlyTotal};

#[derive(Debug, Serialize)]
pub struct MonthlyAnalyticsResponse {
    pub monthly_totals: Vec<MonthlyTotal>,
}

/// GET /api/analytics/monthly - Total amount per month (YYYY-MM)
pub async fn monthly_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlyAnalyticsResponse>, AppError> {
    let monthly_totals = state.db.monthly_totals()?;
    Ok(Json(MonthlyAnalyticsResponse { monthly_totals }))
}

#[derive(Debug, Serialize)]
pub struct CategoryAnalyticsResponse {
    pub category_totals: Vec<CategoryTotal>,
}

/// GET /api/analytics/category - Total amount per category
pub async fn category_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoryAnalyticsResponse>, AppError> {
    let category_totals = state.db.category_totals()?;
    Ok(Json(CategoryAnalyticsResponse { category_totals }))
}
