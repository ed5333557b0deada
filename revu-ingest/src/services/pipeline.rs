//! Review ingestion pipeline
//!
//! One run: fallback orchestration → persistence → trigger report. Each run
//! gets its own `run_id` span and its own RNG.

use crate::config::IngestConfig;
use crate::error::{FetchError, IngestError};
use crate::models::CommittedReview;
use crate::services::fallback_orchestrator::{FallbackOrchestrator, SourceFailure};
use crate::services::persistence_gateway::PersistenceGateway;
use crate::types::{CatalogStore, FetchContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Successful run, serialized as the trigger response body
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub success: bool,
    pub message: String,
    pub data: Vec<CommittedReview>,
    pub source: String,
    /// Sources that were tried and skipped; diagnostics only
    #[serde(skip)]
    pub skipped_sources: Vec<SourceFailure>,
}

impl IngestReport {
    fn new(data: Vec<CommittedReview>, source: &str, skipped_sources: Vec<SourceFailure>) -> Self {
        Self {
            success: true,
            message: format!("Successfully fetched {} new reviews!", data.len()),
            data,
            source: source.to_string(),
            skipped_sources,
        }
    }
}

pub struct ReviewIngestPipeline {
    orchestrator: FallbackOrchestrator,
    rng_seed: Option<u64>,
    run_counter: AtomicU64,
}

impl ReviewIngestPipeline {
    /// `rng_seed` makes runs reproducible: run n uses `seed + n`
    pub fn new(orchestrator: FallbackOrchestrator, rng_seed: Option<u64>) -> Self {
        Self {
            orchestrator,
            rng_seed,
            run_counter: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &IngestConfig, rng_seed: Option<u64>) -> Result<Self, FetchError> {
        Ok(Self::new(FallbackOrchestrator::from_config(config)?, rng_seed))
    }

    pub fn source_labels(&self) -> Vec<&'static str> {
        self.orchestrator.source_labels()
    }

    fn next_rng(&self) -> StdRng {
        let run = self.run_counter.fetch_add(1, Ordering::Relaxed);
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run)),
            None => StdRng::from_entropy(),
        }
    }

    /// Execute one ingestion run against `store`
    ///
    /// # Errors
    /// `IngestError` only for persistence failures or an unreadable catalog;
    /// upstream failures are absorbed by the fallback chain.
    pub async fn run(&self, store: &dyn CatalogStore) -> Result<IngestReport, IngestError> {
        let run_id = Uuid::new_v4();
        let mut rng = self.next_rng();

        self.run_with_rng(store, &mut rng)
            .instrument(tracing::info_span!("ingest_run", %run_id))
            .await
    }

    /// Same as [`run`](Self::run) with a caller-supplied RNG
    pub async fn run_with_rng(
        &self,
        store: &dyn CatalogStore,
        rng: &mut StdRng,
    ) -> Result<IngestReport, IngestError> {
        let started = Instant::now();
        tracing::info!("Review ingestion started");

        let sourced = {
            let mut ctx = FetchContext { store, rng };
            self.orchestrator.run(&mut ctx).await?
        };

        let committed = PersistenceGateway::new(store)
            .commit(&sourced.drafts)
            .await?;

        tracing::info!(
            source = sourced.source,
            committed = committed.len(),
            skipped_sources = sourced.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Review ingestion completed"
        );

        Ok(IngestReport::new(committed, sourced.source, sourced.failures))
    }
}
