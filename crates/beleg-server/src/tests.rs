//! Router tests using in-process requests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use beleg_core::db::Database;

use crate::{build_router, AppState, ServerConfig};

fn test_app() -> Router {
    let db = Database::in_memory().unwrap();
    let state = AppState::new(db, None, ServerConfig::default()).unwrap();
    build_router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ingest_body(vendor: &str, total: f64, tax: f64, item_amounts: &[f64]) -> Value {
    json!({
        "vendor_name": vendor,
        "date": "2024-03-14",
        "total_amount": total,
        "tax_amount": tax,
        "items": item_amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| json!({"description": format!("Item {}", i), "amount": amount}))
            .collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn health_check_responds() {
    let app = test_app();
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn ingest_then_list_shows_flags() {
    let app = test_app();

    // Items sum to 45 but total is 50: math error expected
    let (status, body) = send(
        &app,
        post_json("/api/ingest", ingest_body("Amazon", 50.0, 9.5, &[45.0])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flag_math_error"], true);
    assert_eq!(body["flag_missing_vat"], false);

    let (status, body) = send(&app, get("/api/receipts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["receipts"][0]["vendor_name"], "Amazon");
    assert_eq!(body["receipts"][0]["line_items"][0]["amount"], 45.0);
}

#[tokio::test]
async fn unknown_receipt_is_404() {
    let app = test_app();
    let (status, body) = send(&app, get("/api/receipts/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Receipt not found");
}

#[tokio::test]
async fn invalid_ingest_is_rejected() {
    let app = test_app();

    let (status, _) = send(
        &app,
        post_json("/api/ingest", ingest_body("", 10.0, 1.9, &[10.0])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = ingest_body("Rewe", 10.0, 1.9, &[10.0]);
    body["date"] = json!("whenever");
    let (status, _) = send(&app, post_json("/api/ingest", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_query_returns_deterministic_payload() {
    let app = test_app();
    for total in [10.0, 20.0, 30.0] {
        let (status, _) = send(
            &app,
            post_json(
                "/api/ingest",
                ingest_body("Rewe", total, total * 0.19, &[total]),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        post_json("/api/chat/query", json!({"query": "receipts under 25"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"], "under 25.00€");
    assert_eq!(body["stats"]["count"], 2);
    assert_eq!(body["stats"]["total"], 30.0);
    assert_eq!(body["stats"]["average"], 15.0);
    // Without an AI backend the calculation block is the answer
    assert!(body["answer"].as_str().unwrap().contains("Total: 30.00€"));
}

#[tokio::test]
async fn audit_findings_are_grouped() {
    let app = test_app();

    // Clean receipt
    send(
        &app,
        post_json("/api/ingest", ingest_body("Rewe", 10.0, 1.9, &[10.0])),
    )
    .await;
    // Math error (items sum 40, total 50) and missing VAT
    send(
        &app,
        post_json("/api/ingest", ingest_body("Amazon", 50.0, 0.0, &[40.0])),
    )
    .await;

    let (status, body) = send(&app, get("/api/audit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["mismatches"], 1);
    assert_eq!(body["summary"]["missing_vat"], 1);
    assert_eq!(body["summary"]["duplicates"], 0);
    assert_eq!(body["mismatches"][0]["expected_total"], 40.0);
    assert_eq!(body["mismatches"][0]["difference"], 10.0);
}

#[tokio::test]
async fn monthly_analytics_buckets_by_month() {
    let app = test_app();
    let mut feb = ingest_body("Rewe", 20.0, 3.8, &[20.0]);
    feb["date"] = json!("2024-02-02");
    send(&app, post_json("/api/ingest", feb)).await;
    send(
        &app,
        post_json("/api/ingest", ingest_body("Rewe", 10.0, 1.9, &[10.0])),
    )
    .await;

    let (status, body) = send(&app, get("/api/analytics/monthly")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monthly_totals"][0]["month"], "2024-02");
    assert_eq!(body["monthly_totals"][0]["total"], 20.0);
    assert_eq!(body["monthly_totals"][1]["month"], "2024-03");
}

#[tokio::test]
async fn upload_without_ai_backend_is_unavailable() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/receipts/upload")
        .body(Body::from("fake image bytes"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("AI backend"));
}

#[tokio::test]
async fn status_reports_store_size() {
    let app = test_app();
    send(
        &app,
        post_json("/api/ingest", ingest_body("Rewe", 10.0, 1.9, &[10.0])),
    )
    .await;

    let (status, body) = send(&app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receipts"], 1);
    assert!(body["ai_backend"].is_null());
}
