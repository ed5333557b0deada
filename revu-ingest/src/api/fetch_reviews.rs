//! Trigger endpoint: POST /api/fetch-reviews
//!
//! Runs one ingestion synchronously and answers with the committed reviews
//! and the label of the source that supplied them.

use axum::{extract::State, routing::post, Json, Router};

use crate::{error::ApiResult, services::IngestReport, AppState};

/// POST /api/fetch-reviews
pub async fn fetch_reviews(State(state): State<AppState>) -> ApiResult<Json<IngestReport>> {
    match state.pipeline.run(state.store.as_ref()).await {
        Ok(report) => {
            *state.last_source.write().await = Some(report.source.clone());
            *state.last_error.write().await = None;
            Ok(Json(report))
        }
        Err(e) => {
            tracing::error!(error = %e, "Review ingestion failed");
            *state.last_error.write().await = Some(e.to_string());
            Err(e.into())
        }
    }
}

/// Build trigger routes
pub fn fetch_review_routes() -> Router<AppState> {
    Router::new().route("/api/fetch-reviews", post(fetch_reviews))
}
