//! Fallback orchestration across review sources
//!
//! Sources are tried strictly in configured order. The first one that
//! yields at least one draft supplies the run; any failure or empty result
//! moves on to the next. When every source is exhausted (or none is
//! enabled) the synthetic generator ends the chain, so upstream trouble
//! never reaches the caller.

use crate::config::IngestConfig;
use crate::error::{FetchError, IngestError};
use crate::models::CanonicalReviewDraft;
use crate::services::sources::{build_sources, SyntheticSource};
use crate::types::{FetchContext, ReviewSource, SourceOutcome};
use std::time::Instant;

/// Position of one orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    NotStarted,
    /// Index into the enabled source list
    TryingSource(usize),
    Succeeded,
    ExhaustedToSynthetic,
}

/// Why a source did not supply the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: &'static str,
    pub reason: String,
    pub status: Option<u16>,
}

/// Drafts plus the label of the source that produced them
#[derive(Debug, Clone)]
pub struct SourcedDrafts {
    pub drafts: Vec<CanonicalReviewDraft>,
    pub source: &'static str,
    pub final_state: OrchestratorState,
    /// Sources skipped before the winning one, in order
    pub failures: Vec<SourceFailure>,
}

pub struct FallbackOrchestrator {
    sources: Vec<Box<dyn ReviewSource>>,
    synthetic: SyntheticSource,
}

impl FallbackOrchestrator {
    pub fn new(sources: Vec<Box<dyn ReviewSource>>) -> Self {
        Self {
            sources,
            synthetic: SyntheticSource,
        }
    }

    /// Build the chain from the enabled sources in `config`
    pub fn from_config(config: &IngestConfig) -> Result<Self, FetchError> {
        let sources = build_sources(config)?;
        tracing::info!(
            sources = ?sources.iter().map(|s| s.label()).collect::<Vec<_>>(),
            "Fallback chain configured"
        );
        Ok(Self::new(sources))
    }

    /// Labels of the configured sources, in fallback order
    pub fn source_labels(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    /// Walk the chain until a source yields drafts
    ///
    /// # Errors
    /// Only `IngestError::CatalogUnavailable`, when even the synthetic
    /// generator cannot read the catalog.
    pub async fn run(&self, ctx: &mut FetchContext<'_>) -> Result<SourcedDrafts, IngestError> {
        let mut state = OrchestratorState::NotStarted;
        let mut failures = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            transition(&mut state, OrchestratorState::TryingSource(index));
            let label = source.label();
            tracing::info!(source = label, "Trying review source");
            let started = Instant::now();

            let failure = match source.fetch(ctx).await {
                Ok(SourceOutcome::Drafts(drafts)) if !drafts.is_empty() => {
                    transition(&mut state, OrchestratorState::Succeeded);
                    tracing::info!(
                        source = label,
                        drafts = drafts.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Review source succeeded"
                    );
                    return Ok(SourcedDrafts {
                        drafts,
                        source: label,
                        final_state: state,
                        failures,
                    });
                }
                Ok(SourceOutcome::Drafts(_)) => SourceFailure {
                    source: label,
                    reason: "no drafts".to_string(),
                    status: None,
                },
                Ok(SourceOutcome::Empty { reason }) => SourceFailure {
                    source: label,
                    reason,
                    status: None,
                },
                Err(err) => SourceFailure {
                    source: label,
                    status: err.status(),
                    reason: err.to_string(),
                },
            };

            tracing::warn!(
                source = label,
                status = failure.status,
                reason = %failure.reason,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Review source failed, falling back"
            );
            failures.push(failure);
        }

        transition(&mut state, OrchestratorState::ExhaustedToSynthetic);
        tracing::info!(
            failed_sources = failures.len(),
            "All external sources exhausted, using synthetic reviews"
        );

        let drafts = self.synthetic.generate(ctx).await?;
        Ok(SourcedDrafts {
            drafts,
            source: self.synthetic.label(),
            final_state: state,
            failures,
        })
    }
}

fn transition(state: &mut OrchestratorState, next: OrchestratorState) {
    tracing::debug!(from = ?*state, to = ?next, "Orchestrator state change");
    *state = next;
}
