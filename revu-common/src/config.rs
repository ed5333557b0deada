//! Bootstrap configuration loading and config file discovery
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! This module owns tier 3 (the TOML file) and the compiled path defaults.
//! Services layer their own CLI/ENV overrides on top.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config/data directories
const APP_DIR: &str = "revu";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional in the file; missing values fall back to the
/// compiled defaults when the service resolves its final configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite catalog database
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Insert a small demo product set when the catalog is empty
    #[serde(default)]
    pub seed_demo_products: bool,

    /// Fixed RNG seed for reproducible ingestion runs
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream review source settings
    #[serde(default)]
    pub sources: SourcesToml,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[sources]` table as written in the TOML file
///
/// Raw, unvalidated values. The ingest service merges these with environment
/// overrides and defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesToml {
    pub catalog_source_enabled: Option<bool>,
    pub marketplace_source_enabled: Option<bool>,
    pub marketplace_api_key: Option<String>,
    pub marketplace_host: Option<String>,
    pub marketplace_item_id: Option<String>,
    pub marketplace_requests_per_second: Option<u32>,
    pub catalog_base_url: Option<String>,
    pub marketplace_base_url: Option<String>,
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

/// Locate the TOML config file
///
/// Priority: explicit path → `env_var` → `<config_dir>/revu/<file_name>`.
/// Returns `None` when nothing exists; a missing file is not an error.
pub fn resolve_config_path(
    cli_path: Option<&Path>,
    env_var: &str,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR).join(file_name))
        .filter(|p| p.exists())
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the TOML config if one was found, otherwise use defaults
///
/// An explicitly located file that fails to parse is an error. A located file
/// that does not exist only produces a warning.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(p) if p.exists() => {
            let config = load_toml_config(p)?;
            info!("Loaded configuration from {}", p.display());
            Ok(config)
        }
        Some(p) => {
            warn!("Config file {} not found, using defaults", p.display());
            Ok(TomlConfig::default())
        }
        None => {
            info!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("revu.db"))
        .unwrap_or_else(|| PathBuf::from("./revu_data/revu.db"))
}

/// User-Agent sent to upstream APIs
pub fn get_user_agent() -> String {
    format!("revu/{}", env!("CARGO_PKG_VERSION"))
}
