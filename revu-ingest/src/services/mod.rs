//! Ingestion services
//!
//! Bottom-up: retry executor and normalizers, source strategies on top of
//! them, then orchestration, persistence and the pipeline that ties a run
//! together.

pub mod fallback_orchestrator;
pub mod normalizer;
pub mod persistence_gateway;
pub mod pipeline;
pub mod retry_executor;
pub mod sources;

pub use fallback_orchestrator::{FallbackOrchestrator, OrchestratorState, SourcedDrafts};
pub use persistence_gateway::PersistenceGateway;
pub use pipeline::{IngestReport, ReviewIngestPipeline};
pub use retry_executor::{RetryExecutor, RetryPhase, RetryPolicy, RetryState};
