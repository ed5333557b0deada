//! Error types for revu-ingest
//!
//! Three layers:
//! - [`FetchError`]: why a single source strategy failed. Never leaves the
//!   fallback orchestrator.
//! - [`IngestError`]: why a whole run failed. Caller-visible.
//! - [`ApiError`]: HTTP mapping for the trigger endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Upstream statuses worth another attempt
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Longest upstream body excerpt kept for diagnostics
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Source strategy failure
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure or timeout talking to the upstream
    #[error("Network error (timeout={timeout}): {message}")]
    Network { message: String, timeout: bool },

    /// Upstream answered with a non-2xx status
    #[error("Upstream error {status}: {body_excerpt}")]
    Upstream { status: u16, body_excerpt: String },

    /// Source cannot run against the current catalog state
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Catalog store failed while the strategy was resolving products
    #[error("Catalog store error: {0}")]
    Store(#[from] revu_common::Error),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Retryable: network failures and statuses in [`RETRYABLE_STATUSES`]
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network { .. } => true,
            FetchError::Upstream { status, .. } => RETRYABLE_STATUSES.contains(status),
            FetchError::Precondition(_) | FetchError::Store(_) | FetchError::Client(_) => false,
        }
    }

    /// Upstream status, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an `Upstream` error, keeping only a short body excerpt
    pub fn upstream(status: u16, body: &str) -> Self {
        FetchError::Upstream {
            status,
            body_excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::upstream(status.as_u16(), &err.to_string());
        }
        if err.is_builder() {
            return FetchError::Client(err.to_string());
        }
        FetchError::Network {
            message: err.to_string(),
            timeout: err.is_timeout(),
        }
    }
}

/// Whole-run failure surfaced to the caller
#[derive(Debug, Error)]
pub enum IngestError {
    /// Insert or re-read failed; earlier rows of the run stay committed
    #[error("Failed to persist reviews: {0}")]
    Persistence(#[source] revu_common::Error),

    /// A draft reached the gateway without a catalog product
    #[error("Review draft {index} has no catalog product")]
    UnresolvedProduct { index: usize },

    /// The store could not be read even for the synthetic fallback
    #[error("Catalog store unavailable: {0}")]
    CatalogUnavailable(#[source] revu_common::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Ingestion run failed (500, or 503 when the catalog is unreadable)
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Ingest(IngestError::UnresolvedProduct { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UNRESOLVED_PRODUCT",
                "Server error while fetching reviews",
            ),
            ApiError::Ingest(IngestError::CatalogUnavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CATALOG_UNAVAILABLE",
                "Catalog store is unavailable",
            ),
            ApiError::Ingest(IngestError::Persistence(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                "Server error while fetching reviews",
            ),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": self.to_string(),
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
