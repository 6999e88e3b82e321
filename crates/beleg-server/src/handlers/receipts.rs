//! Receipt listing, ingestion and image upload handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use beleg_core::ingest::{
    extracted_to_new_receipt, fix_extracted, ingest_receipt, parse_receipt_date,
};
use beleg_core::models::{Category, NewLineItem, NewReceipt, ReceiptDetail};

/// Response for the receipt list
#[derive(Debug, Serialize)]
pub struct ReceiptListResponse {
    pub count: usize,
    pub receipts: Vec<ReceiptDetail>,
}

/// GET /api/receipts - All receipts with line items and audit flags
pub async fn list_receipts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReceiptListResponse>, AppError> {
    let receipts = state.db.list_receipt_details()?;
    Ok(Json(ReceiptListResponse {
        count: receipts.len(),
        receipts,
    }))
}

/// GET /api/receipts/:id - One receipt with line items
pub async fn get_receipt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ReceiptDetail>, AppError> {
    let detail = state
        .db
        .get_receipt_detail(id)?
        .ok_or_else(|| AppError::not_found("Receipt not found"))?;
    Ok(Json(detail))
}

/// Request body for structured ingestion
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub vendor_name: String,
    /// ISO date or datetime
    pub date: String,
    pub total_amount: f64,
    pub tax_amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category: Option<Category>,
    #[serde(default)]
    pub items: Vec<IngestItem>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Deserialize)]
pub struct IngestItem {
    pub description: String,
    pub amount: f64,
}

/// POST /api/ingest - Ingest a structured receipt with line items
///
/// Runs the audit checks as part of ingestion; the response carries the
/// computed flags.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<ReceiptDetail>, AppError> {
    if request.vendor_name.trim().is_empty() {
        return Err(AppError::bad_request("vendor_name must not be empty"));
    }

    let date = request
        .date
        .parse::<chrono::DateTime<Utc>>()
        .ok()
        .or_else(|| parse_receipt_date(&request.date))
        .ok_or_else(|| AppError::bad_request("Unparsable date"))?;

    let receipt = NewReceipt {
        vendor_name: request.vendor_name,
        date,
        total_amount: request.total_amount,
        tax_amount: request.tax_amount,
        currency: request.currency,
        category: request.category,
    };
    let items: Vec<NewLineItem> = request
        .items
        .into_iter()
        .map(|i| NewLineItem {
            description: i.description,
            amount: i.amount,
        })
        .collect();

    let detail = ingest_receipt(&state.db, &receipt, &items, None)?;
    Ok(Json(detail))
}

/// Response for receipt image upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub receipt: ReceiptDetail,
    pub warnings: Vec<String>,
}

/// POST /api/receipts/upload - Extract and ingest a receipt image
///
/// The raw request body is the image. Extraction goes through the AI
/// backend; the content hash guards against ingesting the same image twice.
pub async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    let ai = state.ai.as_ref().ok_or_else(|| {
        AppError::service_unavailable("AI backend not configured (set OLLAMA_HOST)")
    })?;

    let bytes = axum::body::to_bytes(request.into_body(), MAX_UPLOAD_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body or file too large (max 10MB)"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("No image data provided"));
    }

    let image_hash = hex::encode(Sha256::digest(&bytes));
    if let Some(existing) = state.db.get_receipt_by_image_hash(&image_hash)? {
        return Err(AppError::conflict(&format!(
            "Image already ingested as receipt {}",
            existing.id
        )));
    }

    let mut extracted = ai.extract_receipt(&bytes).await?;
    let report = fix_extracted(&mut extracted);

    let (receipt, items) = extracted_to_new_receipt(&extracted, Utc::now());
    let detail = ingest_receipt(&state.db, &receipt, &items, Some(&image_hash))?;

    Ok(Json(UploadResponse {
        receipt: detail,
        warnings: report.warnings,
    }))
}
