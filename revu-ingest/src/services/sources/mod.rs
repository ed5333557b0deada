//! Source strategies: retrieval + normalization per upstream origin
//!
//! Fallback order is Catalog-derived → Marketplace → synthetic. The
//! synthetic generator is not a [`ReviewSource`](crate::types::ReviewSource):
//! it terminates the chain and cannot fail on upstream grounds.

pub mod catalog_derived;
pub mod marketplace;
pub mod synthetic;

pub use catalog_derived::CatalogDerivedSource;
pub use marketplace::MarketplaceSource;
pub use synthetic::{SyntheticSource, MOCK_DATA_LABEL};

use crate::config::{IngestConfig, SourceKind};
use crate::error::FetchError;
use crate::types::ReviewSource;

/// Instantiate the enabled sources in priority order
pub fn build_sources(config: &IngestConfig) -> Result<Vec<Box<dyn ReviewSource>>, FetchError> {
    config
        .enabled_sources()
        .into_iter()
        .map(|kind| -> Result<Box<dyn ReviewSource>, FetchError> {
            match kind {
                SourceKind::CatalogDerived => {
                    Ok(Box::new(CatalogDerivedSource::new(&config.catalog)?))
                }
                SourceKind::Marketplace => Ok(Box::new(MarketplaceSource::new(
                    config.marketplace.clone(),
                    config.retry,
                )?)),
            }
        })
        .collect()
}

/// Response body → JSON, with unparseable bodies mapped to `Null`
///
/// A malformed body is a parse outcome (zero drafts) rather than an error.
pub(crate) fn parse_body(source: &str, body: &str) -> serde_json::Value {
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                source,
                error = %e,
                body_excerpt = %body.chars().take(crate::error::BODY_EXCERPT_CHARS).collect::<String>(),
                "Upstream body is not valid JSON"
            );
            serde_json::Value::Null
        }
    }
}
