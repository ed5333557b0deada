//! revu-ingest library interface
//!
//! Exposes the ingestion pipeline, the catalog store and the HTTP router for
//! the binary and for integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult, FetchError, IngestError};

use axum::Router;
use chrono::{DateTime, Utc};
use services::ReviewIngestPipeline;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use types::CatalogStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog the pipeline reads products from and commits reviews into
    pub store: Arc<dyn CatalogStore>,
    pub pipeline: Arc<ReviewIngestPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last run failure, cleared by the next successful run
    pub last_error: Arc<RwLock<Option<String>>>,
    /// Source label of the last successful run
    pub last_source: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, pipeline: Arc<ReviewIngestPipeline>) -> Self {
        Self {
            store,
            pipeline,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
            last_source: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::fetch_review_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
