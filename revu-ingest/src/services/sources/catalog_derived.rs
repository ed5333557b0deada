//! Catalog-derived source ("FakeStore API")
//!
//! Reads a public product catalog and synthesizes reviews from each
//! product's aggregate rating. Drafts are mapped cyclically onto a random
//! sample of local catalog products.
//!
//! Single attempt per run: failures fall straight through to the next source.

use crate::config::{CatalogSourceSettings, SourceKind};
use crate::error::FetchError;
use crate::services::normalizer::{normalize_catalog_products, ParseOutcome};
use crate::services::sources::parse_body;
use crate::types::{FetchContext, ReviewSource, SourceOutcome};
use rand::seq::SliceRandom;
use revu_common::config::get_user_agent;
use serde_json::Value;
use std::time::Instant;

/// Local products sampled as mapping targets
pub const MAPPING_PRODUCT_SAMPLE: usize = 5;

pub struct CatalogDerivedSource {
    http_client: reqwest::Client,
    base_url: String,
    product_limit: u32,
}

impl CatalogDerivedSource {
    pub fn new(settings: &CatalogSourceSettings) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            product_limit: settings.product_limit,
        })
    }

    async fn fetch_products(&self) -> Result<Value, FetchError> {
        let url = format!("{}/products", self.base_url);
        let limit = self.product_limit.to_string();

        tracing::debug!(url = %url, limit = self.product_limit, "Querying catalog API");
        let started = Instant::now();

        let response = self
            .http_client
            .get(&url)
            .query(&[("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "Catalog API responded"
        );

        if !status.is_success() {
            return Err(FetchError::upstream(status.as_u16(), &body));
        }

        Ok(parse_body(self.label(), &body))
    }
}

#[async_trait::async_trait]
impl ReviewSource for CatalogDerivedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CatalogDerived
    }

    async fn fetch(&self, ctx: &mut FetchContext<'_>) -> Result<SourceOutcome, FetchError> {
        let payload = self.fetch_products().await?;

        let drafts = match normalize_catalog_products(&payload, &mut *ctx.rng) {
            ParseOutcome::Parsed { drafts, .. } => drafts,
            ParseOutcome::NoReviewList { seen_keys } => {
                tracing::warn!(?seen_keys, "No product list in catalog response");
                return Ok(SourceOutcome::Empty {
                    reason: "catalog response had no product list".to_string(),
                });
            }
        };

        if drafts.is_empty() {
            return Ok(SourceOutcome::Empty {
                reason: "no rated products in catalog response".to_string(),
            });
        }

        let products = ctx.store.list_products().await?;
        let targets = products
            .choose_multiple(&mut *ctx.rng, MAPPING_PRODUCT_SAMPLE)
            .cloned()
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return Err(FetchError::Precondition(
                "No products in database to map reviews to".to_string(),
            ));
        }

        // Cycle through the sample so every draft lands on a product
        let drafts = drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| draft.resolved_to(targets[i % targets.len()].id))
            .collect::<Vec<_>>();

        tracing::info!(
            drafts = drafts.len(),
            products = targets.len(),
            "Mapped catalog-derived reviews onto local products"
        );

        Ok(SourceOutcome::Drafts(drafts))
    }
}
