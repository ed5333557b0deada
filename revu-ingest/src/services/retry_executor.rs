//! Upstream Retry Logic
//!
//! Bounded retry with linear backoff around a single upstream call.
//!
//! **Algorithm:**
//! 1. Attempt operation
//! 2. If successful, return result
//! 3. If the failure is retryable (429/500/502/503/504 or network/timeout):
//!    a. If `attempt < max_retries`: log WARN, wait `base_delay * (attempt + 1)`, retry
//!    b. Otherwise: log ERROR, return the last error
//! 4. If the failure is fatal: return it immediately (no retry)
//!
//! The executor never fabricates data; exhaustion always propagates the error.

use crate::error::FetchError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Retry policy for one upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Delay unit; the n-th wait (0-based) is `base_delay * (n + 1)`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Wait inserted after the failed attempt with 0-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Every wait the policy can insert, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|a| self.delay_for(a)).collect()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

/// Phase of one executor invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Idle,
    Attempting,
    BackingOff,
    Succeeded,
    Exhausted,
}

/// Per-invocation retry bookkeeping
#[derive(Debug, Clone)]
pub struct RetryState {
    /// Retries performed so far; never exceeds `max_retries`
    pub attempt: u32,
    pub phase: RetryPhase,
    pub last_error: Option<String>,
    pub next_delay: Option<Duration>,
    /// Waits actually taken, in order
    pub delays: Vec<Duration>,
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 0,
            phase: RetryPhase::Idle,
            last_error: None,
            next_delay: None,
            delays: Vec::new(),
        }
    }

    /// Attempts made, including the first
    pub fn total_attempts(&self) -> u32 {
        match self.phase {
            RetryPhase::Idle => 0,
            _ => self.attempt + 1,
        }
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an upstream operation under a [`RetryPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute `operation`, retrying retryable failures
    ///
    /// # Arguments
    /// * `operation_name` - Name for logging (e.g., "marketplace reviews")
    /// * `operation` - Closure producing a fresh upstream call per attempt
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut state = RetryState::new();
        self.execute_with_state(operation_name, &mut state, operation)
            .await
    }

    /// Same as [`execute`](Self::execute), exposing the retry state to the caller
    pub async fn execute_with_state<F, Fut, T>(
        &self,
        operation_name: &str,
        state: &mut RetryState,
        mut operation: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        loop {
            state.phase = RetryPhase::Attempting;
            state.next_delay = None;
            let started = Instant::now();

            if state.attempt > 0 {
                tracing::info!(
                    operation = operation_name,
                    attempt = state.attempt + 1,
                    max_attempts = self.policy.max_attempts(),
                    "Retrying upstream call"
                );
            }

            let result = operation().await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let err = match result {
                Ok(value) => {
                    state.phase = RetryPhase::Succeeded;
                    tracing::info!(
                        operation = operation_name,
                        attempt = state.attempt + 1,
                        elapsed_ms,
                        "Upstream call succeeded"
                    );
                    return Ok(value);
                }
                Err(err) => err,
            };

            state.last_error = Some(err.to_string());
            let retryable = err.is_retryable();

            tracing::warn!(
                operation = operation_name,
                attempt = state.attempt + 1,
                status = err.status(),
                elapsed_ms,
                retryable,
                error = %err,
                "Upstream call failed"
            );

            if !retryable {
                state.phase = RetryPhase::Exhausted;
                tracing::error!(
                    operation = operation_name,
                    attempt = state.attempt + 1,
                    status = err.status(),
                    "Fatal upstream error, not retrying"
                );
                return Err(err);
            }

            if state.attempt >= self.policy.max_retries {
                state.phase = RetryPhase::Exhausted;
                tracing::error!(
                    operation = operation_name,
                    attempts = state.attempt + 1,
                    status = err.status(),
                    "Upstream call failed: retries exhausted"
                );
                return Err(err);
            }

            let delay = self.policy.delay_for(state.attempt);
            state.next_delay = Some(delay);
            state.phase = RetryPhase::BackingOff;

            tracing::warn!(
                operation = operation_name,
                attempt = state.attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Backing off before retry"
            );

            tokio::time::sleep(delay).await;
            state.delays.push(delay);
            state.attempt += 1;
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
