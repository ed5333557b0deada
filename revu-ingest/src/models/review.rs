//! Review records flowing through the ingestion pipeline
//!
//! A [`CanonicalReviewDraft`] is the source-independent shape every adapter
//! produces. The constructor enforces the draft invariants, so a draft that
//! exists is always insertable apart from its product reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest rating the catalog accepts
pub const MIN_RATING: u8 = 1;
/// Highest rating the catalog accepts
pub const MAX_RATING: u8 = 5;
/// Rating used when a source supplies none or an unparseable one
pub const NEUTRAL_RATING: u8 = 5;
/// Maximum comment length in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// Placeholder used if a draft is built with a blank reviewer name
const FALLBACK_REVIEWER: &str = "Anonymous Reviewer";

/// Catalog product reference carried by a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductRef {
    /// Existing catalog product id
    Resolved(i64),
    /// Not yet mapped onto the catalog
    Unresolved,
}

impl ProductRef {
    pub fn id(&self) -> Option<i64> {
        match self {
            ProductRef::Resolved(id) => Some(*id),
            ProductRef::Unresolved => None,
        }
    }
}

/// Normalized, pre-persistence review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalReviewDraft {
    pub product_ref: ProductRef,
    pub reviewer_name: String,
    /// Always within `MIN_RATING..=MAX_RATING`
    pub rating: u8,
    /// At most `MAX_COMMENT_CHARS` characters
    pub comment: String,
}

impl CanonicalReviewDraft {
    /// Build a draft, clamping the rating and truncating the comment
    pub fn new(
        product_ref: ProductRef,
        reviewer_name: impl Into<String>,
        rating: i64,
        comment: impl Into<String>,
    ) -> Self {
        let reviewer_name = reviewer_name.into();
        let reviewer_name = if reviewer_name.trim().is_empty() {
            FALLBACK_REVIEWER.to_string()
        } else {
            reviewer_name
        };

        Self {
            product_ref,
            reviewer_name,
            rating: rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8,
            comment: truncate_comment(&comment.into()),
        }
    }

    /// Same draft, attached to a catalog product
    pub fn resolved_to(mut self, product_id: i64) -> Self {
        self.product_ref = ProductRef::Resolved(product_id);
        self
    }
}

/// Review row after insertion, joined with its product's display fields
///
/// Field names follow the catalog's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommittedReview {
    pub id: i64,
    pub product_id: i64,
    pub user_name: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub product_name: String,
    pub product_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The slice of a catalog product the pipeline reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogProduct {
    pub id: i64,
    pub name: String,
}

/// Round and clamp an arbitrary numeric rating into `MIN_RATING..=MAX_RATING`
///
/// Non-finite input maps to `NEUTRAL_RATING`.
pub fn clamp_rating(value: f64) -> u8 {
    if !value.is_finite() {
        return NEUTRAL_RATING;
    }
    value
        .round()
        .clamp(MIN_RATING as f64, MAX_RATING as f64) as u8
}

/// Cut a comment down to `MAX_COMMENT_CHARS` characters
pub fn truncate_comment(comment: &str) -> String {
    match comment.char_indices().nth(MAX_COMMENT_CHARS) {
        Some((byte_idx, _)) => comment[..byte_idx].to_string(),
        None => comment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rating_is_total() {
        for raw in [-1e9, -3.0, 0.0, 0.4, 1.0, 2.5, 4.6, 5.0, 5.4, 17.0, 1e12] {
            let r = clamp_rating(raw);
            assert!((MIN_RATING..=MAX_RATING).contains(&r), "{} -> {}", raw, r);
        }
        assert_eq!(clamp_rating(f64::NAN), NEUTRAL_RATING);
        assert_eq!(clamp_rating(f64::INFINITY), NEUTRAL_RATING);
    }

    #[test]
    fn test_clamp_rating_rounds() {
        assert_eq!(clamp_rating(4.6), 5);
        assert_eq!(clamp_rating(4.4), 4);
        assert_eq!(clamp_rating(0.2), 1);
        assert_eq!(clamp_rating(9.0), 5);
    }

    #[test]
    fn test_truncate_comment_exact_length() {
        let long = "x".repeat(1200);
        assert_eq!(truncate_comment(&long).chars().count(), MAX_COMMENT_CHARS);

        let short = "fine";
        assert_eq!(truncate_comment(short), "fine");
    }

    #[test]
    fn test_truncate_comment_multibyte() {
        let long = "é".repeat(600);
        let cut = truncate_comment(&long);
        assert_eq!(cut.chars().count(), MAX_COMMENT_CHARS);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_draft_new_enforces_invariants() {
        let draft = CanonicalReviewDraft::new(ProductRef::Unresolved, "  ", 42, "y".repeat(501));
        assert_eq!(draft.rating, MAX_RATING);
        assert_eq!(draft.comment.chars().count(), MAX_COMMENT_CHARS);
        assert!(!draft.reviewer_name.trim().is_empty());

        let low = CanonicalReviewDraft::new(ProductRef::Unresolved, "ann", -4, "ok");
        assert_eq!(low.rating, MIN_RATING);
    }

    #[test]
    fn test_resolved_to() {
        let draft = CanonicalReviewDraft::new(ProductRef::Unresolved, "ann", 3, "ok").resolved_to(9);
        assert_eq!(draft.product_ref, ProductRef::Resolved(9));
        assert_eq!(draft.product_ref.id(), Some(9));
    }
}
