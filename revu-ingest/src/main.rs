//! revu-ingest - Review Ingestion Service
//!
//! Pulls product reviews from external sources (with fallback down to
//! synthetic data) into the catalog on demand.
//!
//! Routes:
//! - `POST /api/fetch-reviews` runs one ingestion
//! - `GET /health`

use anyhow::{Context, Result};
use clap::Parser;
use revu_common::config::{
    default_database_path, load_or_default, resolve_config_path, TomlConfig,
};
use revu_ingest::config::IngestConfig;
use revu_ingest::db::{self, SqliteCatalogStore};
use revu_ingest::services::ReviewIngestPipeline;
use revu_ingest::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

const DEFAULT_PORT: u16 = 4000;
const CONFIG_ENV_VAR: &str = "REVU_CONFIG";
const CONFIG_FILE_NAME: &str = "revu-ingest.toml";

#[derive(Parser, Debug)]
#[command(name = "revu-ingest")]
#[command(about = "Review ingestion service for the revu catalog")]
#[command(version)]
struct Args {
    /// HTTP port (overrides the config file)
    #[arg(short, long, env = "REVU_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "REVU_DATABASE")]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Insert demo products when the catalog is empty
    #[arg(long)]
    seed_demo_products: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, CONFIG_FILE_NAME);
    let toml_config: TomlConfig =
        load_or_default(config_path.as_deref()).context("Failed to load configuration")?;

    revu_common::logging::init_tracing(&toml_config.logging)
        .context("Failed to initialize tracing")?;

    info!("Starting revu-ingest (Review Ingestion) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let ingest_config =
        IngestConfig::resolve(&toml_config.sources).context("Invalid source configuration")?;
    info!(sources = ?ingest_config.enabled_sources(), "Source configuration resolved");

    let db_path = args
        .database
        .or_else(|| toml_config.database_path.clone())
        .unwrap_or_else(default_database_path);
    info!("Database: {}", db_path.display());

    let pool = db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    if args.seed_demo_products || toml_config.seed_demo_products {
        db::seed_demo_products(&pool).await?;
    }

    let pipeline = ReviewIngestPipeline::from_config(&ingest_config, toml_config.rng_seed)
        .context("Failed to build review sources")?;

    let state = AppState::new(Arc::new(SqliteCatalogStore::new(pool)), Arc::new(pipeline));
    let app = revu_ingest::build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Trigger: POST http://{}/api/fetch-reviews", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
