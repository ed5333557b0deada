//! Core trait definitions for revu-ingest
//!
//! Two seams:
//! - [`CatalogStore`]: the external catalog the pipeline reads products from
//!   and commits reviews into
//! - [`ReviewSource`]: one upstream origin of review data (retrieval plus
//!   normalization)

use crate::config::SourceKind;
use crate::error::FetchError;
use crate::models::{CanonicalReviewDraft, CatalogProduct, CommittedReview};
use rand::rngs::StdRng;
use revu_common::Result;

/// Catalog store contract consumed by the pipeline
///
/// The pipeline never creates or mutates products. It only lists them and
/// inserts review rows.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// List all products in a stable order (by id)
    async fn list_products(&self) -> Result<Vec<CatalogProduct>>;

    /// Insert one review row, returning its id
    async fn insert_review(
        &self,
        product_id: i64,
        reviewer_name: &str,
        rating: u8,
        comment: &str,
    ) -> Result<i64>;

    /// Re-read a review joined with its product's display fields
    async fn get_review_with_product(&self, id: i64) -> Result<CommittedReview>;
}

/// Per-run inputs shared with each source strategy
pub struct FetchContext<'a> {
    pub store: &'a dyn CatalogStore,
    /// Seedable randomness for names, templates and product choice
    pub rng: &'a mut StdRng,
}

/// What a source strategy produced
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// Drafts with resolved product references
    Drafts(Vec<CanonicalReviewDraft>),
    /// Upstream answered but nothing usable came out of it
    Empty { reason: String },
}

/// One upstream origin of review data
///
/// # Example
/// ```rust,ignore
/// pub struct StaticSource;
///
/// #[async_trait::async_trait]
/// impl ReviewSource for StaticSource {
///     fn kind(&self) -> SourceKind { SourceKind::CatalogDerived }
///
///     async fn fetch(&self, ctx: &mut FetchContext<'_>) -> Result<SourceOutcome, FetchError> {
///         Ok(SourceOutcome::Empty { reason: "nothing configured".into() })
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Label reported when this source supplies the run's data
    fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Retrieve, normalize and resolve drafts
    ///
    /// # Errors
    /// Any `FetchError` moves the orchestrator to the next source.
    async fn fetch(&self, ctx: &mut FetchContext<'_>) -> std::result::Result<SourceOutcome, FetchError>;
}
