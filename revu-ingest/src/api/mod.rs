//! HTTP API handlers for revu-ingest

pub mod fetch_reviews;
pub mod health;

pub use fetch_reviews::fetch_review_routes;
pub use health::health_routes;
