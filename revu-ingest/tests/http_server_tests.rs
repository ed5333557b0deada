//! HTTP Server & Routing Integration Tests
//!
//! Router-level tests through `tower::ServiceExt::oneshot`; no sockets.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::{ingest_config, memory_store, FailingInsertStore};
use http_body_util::BodyExt;
use revu_ingest::services::ReviewIngestPipeline;
use revu_ingest::types::CatalogStore;
use revu_ingest::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// App state with every networked source disabled
fn test_app_state(store: Arc<dyn CatalogStore>) -> AppState {
    let pipeline = ReviewIngestPipeline::from_config(&ingest_config(None, None), Some(11)).unwrap();
    AppState::new(store, Arc::new(pipeline))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn trigger_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/fetch-reviews")
        .body(Body::empty())
        .unwrap()
}

fn health_request() -> Request<Body> {
    Request::builder().uri("/health").body(Body::empty()).unwrap()
}

/// TC-HTTP-001: Health endpoint reports module identity
#[tokio::test]
async fn tc_http_001_health_reports_module() {
    // Given: Fresh service
    let (_pool, store) = memory_store(1).await;
    let app = build_router(test_app_state(Arc::new(store)));

    // When: GET /health
    let response = app.oneshot(health_request()).await.unwrap();

    // Then: 200 with module info and no diagnostics yet
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "revu-ingest");
    assert!(body["uptime_seconds"].is_u64());
    assert!(body.get("last_error").is_none());
    assert!(body.get("last_source").is_none());
}

/// TC-HTTP-002: Trigger returns committed reviews and the source label
#[tokio::test]
async fn tc_http_002_trigger_returns_report() {
    // Given: Catalog with products, no networked sources
    let (_pool, store) = memory_store(3).await;
    let app = build_router(test_app_state(Arc::new(store)));

    // When: POST /api/fetch-reviews
    let response = app.clone().oneshot(trigger_request()).await.unwrap();

    // Then: Success body in the catalog's row shape
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "Mock Data");
    assert_eq!(body["message"], "Successfully fetched 2 new reviews!");

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for review in data {
        for field in [
            "id",
            "product_id",
            "user_name",
            "rating",
            "comment",
            "product_name",
            "product_image",
            "created_at",
        ] {
            assert!(review.get(field).is_some(), "missing {}", field);
        }
    }

    // And: Health remembers the source
    let body = body_json(app.oneshot(health_request()).await.unwrap()).await;
    assert_eq!(body["last_source"], "Mock Data");
}

/// TC-HTTP-003: Persistence failure maps to 500 and degrades health
#[tokio::test]
async fn tc_http_003_persistence_failure_is_500() {
    // Given: Store that fails the first insert
    let (_pool, store) = memory_store(2).await;
    let app = build_router(test_app_state(Arc::new(FailingInsertStore::new(store, 0))));

    // When: POST /api/fetch-reviews
    let response = app.clone().oneshot(trigger_request()).await.unwrap();

    // Then: Failure body
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
    assert!(body["message"].is_string());
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to persist reviews"));

    let health = body_json(app.oneshot(health_request()).await.unwrap()).await;
    assert_eq!(health["status"], "degraded");
    assert!(health["last_error"].as_str().unwrap().contains("persist"));
}

/// TC-HTTP-004: Unreadable catalog maps to 503
#[tokio::test]
async fn tc_http_004_catalog_unavailable_is_503() {
    let (pool, store) = memory_store(1).await;
    pool.close().await;
    let app = build_router(test_app_state(Arc::new(store)));

    let response = app.oneshot(trigger_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CATALOG_UNAVAILABLE");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Catalog store unavailable"));
}

/// TC-HTTP-005: Trigger only accepts POST
#[tokio::test]
async fn tc_http_005_trigger_rejects_get() {
    let (_pool, store) = memory_store(1).await;
    let app = build_router(test_app_state(Arc::new(store)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/fetch-reviews")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
