//! Synthetic review generator ("Mock Data")
//!
//! Last link of the fallback chain. Needs no network and only fails if the
//! catalog store itself cannot be read.

use crate::error::IngestError;
use crate::models::{CanonicalReviewDraft, ProductRef, MAX_RATING, MIN_RATING};
use crate::types::FetchContext;
use rand::Rng;
use revu_common::time::epoch_millis;

/// Source label reported when the generator supplies a run's data
pub const MOCK_DATA_LABEL: &str = "Mock Data";

const TEMPLATES: [(&str, &str); 2] = [
    ("User", "New review fetched from external system!"),
    ("AutoFetch", "Automatically collected review - great product!"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn label(&self) -> &'static str {
        MOCK_DATA_LABEL
    }

    /// Two drafts on random existing products, or none for an empty catalog
    ///
    /// # Errors
    /// `IngestError::CatalogUnavailable` if the product listing fails.
    pub async fn generate(
        &self,
        ctx: &mut FetchContext<'_>,
    ) -> Result<Vec<CanonicalReviewDraft>, IngestError> {
        let products = ctx
            .store
            .list_products()
            .await
            .map_err(IngestError::CatalogUnavailable)?;

        if products.is_empty() {
            tracing::warn!("Catalog has no products; synthetic generator produced no reviews");
            return Ok(Vec::new());
        }

        let stamp = epoch_millis();
        let drafts = TEMPLATES
            .iter()
            .map(|(prefix, comment)| {
                let product = &products[ctx.rng.gen_range(0..products.len())];
                let rating = ctx.rng.gen_range(MIN_RATING..=MAX_RATING);
                CanonicalReviewDraft::new(
                    ProductRef::Resolved(product.id),
                    format!("{}_{}", prefix, stamp),
                    rating as i64,
                    *comment,
                )
            })
            .collect::<Vec<_>>();

        tracing::info!(drafts = drafts.len(), "Generated synthetic reviews");
        Ok(drafts)
    }
}
