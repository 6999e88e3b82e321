//! Audit findings handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use beleg_core::audit::math_error_difference;

/// One flagged receipt in the findings report
#[derive(Debug, Serialize)]
pub struct AuditFinding {
    pub receipt_id: i64,
    pub vendor: String,
    pub date: String,
    pub total: f64,
    pub issue: &'static str,
    /// Only set for math errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
pub struct AuditSummary {
    pub duplicates: usize,
    pub mismatches: usize,
    pub missing_vat: usize,
    pub suspicious: usize,
}

/// Flagged receipts grouped by issue kind
#[derive(Debug, Default, Serialize)]
pub struct AuditFindingsResponse {
    pub duplicates: Vec<AuditFinding>,
    pub mismatches: Vec<AuditFinding>,
    pub missing_vat: Vec<AuditFinding>,
    pub suspicious: Vec<AuditFinding>,
    pub summary: AuditSummary,
}

/// GET /api/audit - All receipts with at least one audit flag, grouped
///
/// A receipt with several flags appears in several groups.
pub async fn audit_findings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuditFindingsResponse>, AppError> {
    let flagged = state.db.list_flagged_receipts()?;
    let mut response = AuditFindingsResponse::default();

    for receipt in &flagged {
        let base = |issue: &'static str| AuditFinding {
            receipt_id: receipt.id,
            vendor: receipt.vendor_name.clone(),
            date: receipt.date.format("%Y-%m-%d").to_string(),
            total: receipt.total_amount,
            issue,
            expected_total: None,
            difference: None,
        };

        if receipt.flag_duplicate {
            response.duplicates.push(base("Duplicate receipt"));
        }
        if receipt.flag_math_error {
            let items = state.db.get_line_items(receipt.id)?;
            let expected: f64 = items.iter().map(|i| i.amount).sum();
            let mut finding = base("Total mismatch");
            finding.expected_total = Some(expected);
            finding.difference = Some(math_error_difference(&items, receipt.total_amount));
            response.mismatches.push(finding);
        }
        if receipt.flag_missing_vat {
            response.missing_vat.push(base("Missing VAT"));
        }
        if receipt.flag_suspicious {
            response.suspicious.push(base("Suspicious items"));
        }
    }

    response.summary = AuditSummary {
        duplicates: response.duplicates.len(),
        mismatches: response.mismatches.len(),
        missing_vat: response.missing_vat.len(),
        suspicious: response.suspicious.len(),
    };

    Ok(Json(response))
}
