//! Marketplace source ("RapidAPI (Amazon)")
//!
//! Reads real reviews for one configured item from a paid marketplace API.
//! The call runs under the [`RetryExecutor`] and a client-side rate limit;
//! every kept review is attached to one randomly chosen local product.

use crate::config::{MarketplaceSettings, SourceKind};
use crate::error::FetchError;
use crate::services::normalizer::{normalize_marketplace_payload, ParseOutcome};
use crate::services::retry_executor::{RetryExecutor, RetryPolicy};
use crate::services::sources::parse_body;
use crate::types::{FetchContext, ReviewSource, SourceOutcome};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::seq::SliceRandom;
use revu_common::config::get_user_agent;
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Instant;

const REVIEWS_PATH: &str = "/product-reviews";
const COUNTRY: &str = "US";
const SORT_BY: &str = "TOP_REVIEWS";
const STAR_RATING: &str = "ALL";
const VERIFIED_PURCHASES_ONLY: &str = "false";
const PAGE: &str = "1";

pub struct MarketplaceSource {
    http_client: reqwest::Client,
    settings: MarketplaceSettings,
    executor: RetryExecutor,
    rate_limiter: DefaultDirectRateLimiter,
}

impl MarketplaceSource {
    pub fn new(settings: MarketplaceSettings, retry: RetryPolicy) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        let per_second = NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        tracing::debug!(settings = ?settings, "Marketplace source configured");

        Ok(Self {
            http_client,
            settings,
            executor: RetryExecutor::new(retry),
            rate_limiter,
        })
    }

    /// One HTTP attempt; the executor decides whether to repeat it
    async fn request_reviews(&self) -> Result<Value, FetchError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.settings.endpoint_base(), REVIEWS_PATH);
        let params = [
            ("asin", self.settings.item_id.as_str()),
            ("country", COUNTRY),
            ("sort_by", SORT_BY),
            ("star_rating", STAR_RATING),
            ("verified_purchases_only", VERIFIED_PURCHASES_ONLY),
            ("images_or_videos_only", "false"),
            ("current_format_only", "false"),
            ("page", PAGE),
        ];

        tracing::debug!(url = %url, item_id = %self.settings.item_id, "Querying marketplace API");
        let started = Instant::now();

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .header("x-rapidapi-key", &self.settings.api_key)
            .header("x-rapidapi-host", &self.settings.host)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "Marketplace API responded"
        );

        if !status.is_success() {
            return Err(FetchError::upstream(status.as_u16(), &body));
        }

        Ok(parse_body(self.label(), &body))
    }
}

#[async_trait::async_trait]
impl ReviewSource for MarketplaceSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Marketplace
    }

    async fn fetch(&self, ctx: &mut FetchContext<'_>) -> Result<SourceOutcome, FetchError> {
        // Resolve the target before spending a paid request
        let products = ctx.store.list_products().await?;
        let target = products.choose(&mut *ctx.rng).cloned().ok_or_else(|| {
            FetchError::Precondition("No products in database to map reviews to".to_string())
        })?;

        let payload = self
            .executor
            .execute("marketplace reviews", || self.request_reviews())
            .await?;

        match normalize_marketplace_payload(&payload, &mut *ctx.rng) {
            ParseOutcome::NoReviewList { seen_keys } => {
                tracing::warn!(?seen_keys, "No reviews found in marketplace response");
                Ok(SourceOutcome::Empty {
                    reason: "marketplace response had no review list".to_string(),
                })
            }
            ParseOutcome::Parsed { drafts, .. } if drafts.is_empty() => Ok(SourceOutcome::Empty {
                reason: "marketplace returned zero reviews".to_string(),
            }),
            ParseOutcome::Parsed {
                drafts,
                matched_rule,
            } => {
                tracing::info!(
                    drafts = drafts.len(),
                    matched_rule,
                    product_id = target.id,
                    product = %target.name,
                    "Mapped marketplace reviews onto local product"
                );
                Ok(SourceOutcome::Drafts(
                    drafts
                        .into_iter()
                        .map(|d| d.resolved_to(target.id))
                        .collect(),
                ))
            }
        }
    }
}
