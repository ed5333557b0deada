//! Data models for revu-ingest

pub mod review;

pub use review::{
    clamp_rating, truncate_comment, CanonicalReviewDraft, CatalogProduct, CommittedReview,
    ProductRef, MAX_COMMENT_CHARS, MAX_RATING, MIN_RATING, NEUTRAL_RATING,
};
