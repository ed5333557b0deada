//! Persistence gateway: drafts → committed catalog reviews
//!
//! Each draft is inserted and immediately re-read joined with its product,
//! one at a time and in order. There is no transaction around a run: if
//! record k fails, records before k stay committed and the run reports an
//! `IngestError::Persistence`.

use crate::error::IngestError;
use crate::models::{CanonicalReviewDraft, CommittedReview, ProductRef};
use crate::types::CatalogStore;

pub struct PersistenceGateway<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> PersistenceGateway<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Commit `drafts` in order, returning the joined rows
    ///
    /// Unresolved drafts are rejected before anything is written.
    pub async fn commit(
        &self,
        drafts: &[CanonicalReviewDraft],
    ) -> Result<Vec<CommittedReview>, IngestError> {
        if let Some(index) = drafts
            .iter()
            .position(|d| d.product_ref == ProductRef::Unresolved)
        {
            tracing::error!(index, "Draft without catalog product reached persistence");
            return Err(IngestError::UnresolvedProduct { index });
        }

        let mut committed = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            let ProductRef::Resolved(product_id) = draft.product_ref else {
                return Err(IngestError::UnresolvedProduct { index });
            };

            let review_id = self
                .store
                .insert_review(product_id, &draft.reviewer_name, draft.rating, &draft.comment)
                .await
                .map_err(|e| {
                    tracing::error!(
                        index,
                        product_id,
                        committed = committed.len(),
                        error = %e,
                        "Review insert failed"
                    );
                    IngestError::Persistence(e)
                })?;

            let review = self
                .store
                .get_review_with_product(review_id)
                .await
                .map_err(|e| {
                    tracing::error!(index, review_id, error = %e, "Review re-read failed");
                    IngestError::Persistence(e)
                })?;

            tracing::debug!(review_id, product_id, "Review committed");
            committed.push(review);
        }

        Ok(committed)
    }
}
