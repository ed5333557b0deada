//! Configuration resolution for revu-ingest
//!
//! Source settings resolve with ENV → TOML → compiled default priority and
//! are frozen into one immutable [`IngestConfig`] at startup. The pipeline
//! receives it explicitly; nothing downstream reads the environment.

use crate::services::retry_executor::RetryPolicy;
use revu_common::config::SourcesToml;
use revu_common::{Error, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

pub const ENV_CATALOG_SOURCE_ENABLED: &str = "REVU_CATALOG_SOURCE_ENABLED";
pub const ENV_MARKETPLACE_SOURCE_ENABLED: &str = "REVU_MARKETPLACE_SOURCE_ENABLED";
pub const ENV_MARKETPLACE_API_KEY: &str = "REVU_MARKETPLACE_API_KEY";
pub const ENV_MARKETPLACE_HOST: &str = "REVU_MARKETPLACE_HOST";
pub const ENV_MAX_RETRIES: &str = "REVU_MAX_RETRIES";
pub const ENV_BASE_DELAY_MS: &str = "REVU_BASE_DELAY_MS";

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_MARKETPLACE_HOST: &str = "real-time-amazon-data.p.rapidapi.com";
pub const DEFAULT_MARKETPLACE_ITEM_ID: &str = "B08N5WRWNW";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;

/// Upstream review sources known to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Free product catalog; reviews synthesized from aggregate ratings
    CatalogDerived,
    /// Paid, rate-limited marketplace reviews API
    Marketplace,
}

impl SourceKind {
    /// Label reported to the caller when this source supplied the data
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::CatalogDerived => "FakeStore API",
            SourceKind::Marketplace => "RapidAPI (Amazon)",
        }
    }
}

/// One entry of the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub kind: SourceKind,
    pub enabled: bool,
    /// Lower runs first
    pub priority: u8,
}

/// Catalog-derived source endpoint
#[derive(Debug, Clone)]
pub struct CatalogSourceSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub product_limit: u32,
}

/// Marketplace source endpoint and credentials
#[derive(Clone)]
pub struct MarketplaceSettings {
    pub api_key: String,
    pub host: String,
    /// Overrides `https://{host}` when set
    pub base_url: Option<String>,
    pub item_id: String,
    pub timeout: Duration,
    pub requests_per_second: u32,
}

impl MarketplaceSettings {
    pub fn endpoint_base(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host),
        }
    }
}

// API key stays out of logs
impl std::fmt::Debug for MarketplaceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceSettings")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("host", &self.host)
            .field("base_url", &self.base_url)
            .field("item_id", &self.item_id)
            .field("timeout", &self.timeout)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

/// Immutable source configuration for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Fallback chain, in configured order
    pub sources: Vec<SourceEntry>,
    pub catalog: CatalogSourceSettings,
    pub marketplace: MarketplaceSettings,
    pub retry: RetryPolicy,
}

impl IngestConfig {
    /// Resolve from TOML values and the process environment
    pub fn resolve(toml: &SourcesToml) -> Result<Self> {
        Self::resolve_with(toml, |name| std::env::var(name).ok())
    }

    /// Resolve from TOML values and an arbitrary environment lookup
    pub fn resolve_with<F>(toml: &SourcesToml, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog_enabled = parse_env_bool(&env, ENV_CATALOG_SOURCE_ENABLED)?
            .or(toml.catalog_source_enabled)
            .unwrap_or(true);

        let marketplace_requested = parse_env_bool(&env, ENV_MARKETPLACE_SOURCE_ENABLED)?
            .or(toml.marketplace_source_enabled)
            .unwrap_or(false);

        let api_key = env(ENV_MARKETPLACE_API_KEY)
            .filter(|k| is_valid_key(k))
            .or_else(|| toml.marketplace_api_key.clone().filter(|k| is_valid_key(k)))
            .unwrap_or_default();

        // A paid source without credentials can only fail
        let marketplace_enabled = marketplace_requested && is_valid_key(&api_key);
        if marketplace_requested && !marketplace_enabled {
            warn!("Marketplace source enabled but no API key configured; disabling it");
        }

        let host = env(ENV_MARKETPLACE_HOST)
            .filter(|h| !h.trim().is_empty())
            .or_else(|| toml.marketplace_host.clone())
            .unwrap_or_else(|| DEFAULT_MARKETPLACE_HOST.to_string());

        let max_retries = parse_env(&env, ENV_MAX_RETRIES)?
            .or(toml.max_retries)
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let base_delay_ms = parse_env(&env, ENV_BASE_DELAY_MS)?
            .or(toml.base_delay_ms)
            .unwrap_or(DEFAULT_BASE_DELAY_MS);

        let requests_per_second = toml.marketplace_requests_per_second.unwrap_or(1);
        if requests_per_second == 0 {
            return Err(Error::Config(
                "marketplace_requests_per_second must be at least 1".to_string(),
            ));
        }

        let config = Self {
            sources: vec![
                SourceEntry {
                    kind: SourceKind::CatalogDerived,
                    enabled: catalog_enabled,
                    priority: 0,
                },
                SourceEntry {
                    kind: SourceKind::Marketplace,
                    enabled: marketplace_enabled,
                    priority: 1,
                },
            ],
            catalog: CatalogSourceSettings {
                base_url: toml
                    .catalog_base_url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.to_string()),
                timeout: Duration::from_secs(10),
                product_limit: 5,
            },
            marketplace: MarketplaceSettings {
                api_key,
                host,
                base_url: toml
                    .marketplace_base_url
                    .clone()
                    .filter(|u| !u.trim().is_empty()),
                item_id: toml
                    .marketplace_item_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MARKETPLACE_ITEM_ID.to_string()),
                timeout: Duration::from_secs(30),
                requests_per_second,
            },
            retry: RetryPolicy::new(max_retries, Duration::from_millis(base_delay_ms)),
        };

        info!(
            catalog_enabled,
            marketplace_enabled,
            max_retries,
            base_delay_ms,
            "Ingest source configuration resolved"
        );

        Ok(config)
    }

    /// Enabled sources in the order they should be tried
    pub fn enabled_sources(&self) -> Vec<SourceKind> {
        let mut entries: Vec<&SourceEntry> = self.sources.iter().filter(|s| s.enabled).collect();
        entries.sort_by_key(|s| s.priority);
        entries.into_iter().map(|s| s.kind).collect()
    }

    /// Toggle one source; used when building configurations programmatically
    pub fn with_source_enabled(mut self, kind: SourceKind, enabled: bool) -> Self {
        for entry in self.sources.iter_mut().filter(|e| e.kind == kind) {
            entry.enabled = enabled;
        }
        self
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Parse a boolean environment value (`true/false/1/0/yes/no`)
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_env_bool<F>(env: &F, name: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match env(name) {
        None => Ok(None),
        Some(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| Error::Config(format!("{} must be a boolean, got '{}'", name, raw))),
    }
}

fn parse_env<F, T>(env: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{} is invalid ('{}'): {}", name, raw, e))),
    }
}
