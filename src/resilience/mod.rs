//! Resilience Module
//!
//! `ResilientStore` wraps any `RecordStore` and runs each call through a
//! circuit breaker, a bounded retry loop with linear backoff, and a
//! per-attempt timeout:
//!
//! ```text
//! breaker ── retry ── timeout ── inner call
//! ```
//!
//! The breaker sees one outcome per logical call, after retries are spent.

mod breaker;
mod policy;

use std::future::Future;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{error, warn};

use crate::error::{Result, StoreError};
use crate::models::{ListQuery, Record};
use crate::store::RecordStore;

pub use breaker::{CircuitBreaker, CircuitState, Permit};
pub use policy::ResiliencePolicy;

// == Resilient Store ==
pub struct ResilientStore<S> {
    inner: S,
    policy: ResiliencePolicy,
    breaker: CircuitBreaker,
}

impl<S: RecordStore> ResilientStore<S> {
    pub fn new(inner: S, policy: ResiliencePolicy) -> Self {
        let breaker = CircuitBreaker::new(policy.failure_threshold, policy.break_duration);
        Self {
            inner,
            policy,
            breaker,
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Runs `call` under the full policy stack.
    async fn execute<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let permit = match self.breaker.try_acquire() {
            Ok(permit) => permit,
            Err(err) => {
                warn!("{} rejected: circuit open", operation);
                return Err(err);
            }
        };

        // If this future is dropped mid-call the permit releases a trial slot.
        let outcome = self.with_retry(operation, call).await;
        match &outcome {
            Err(err @ StoreError::RetriesExhausted { .. }) => {
                error!("{} failed: {}", operation, err);
                permit.fail();
            }
            // Non-transient errors mean the store answered.
            _ => permit.succeed(),
        }
        outcome
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            // Dropping the timed-out future cancels the attempt.
            let result = match timeout(self.policy.attempt_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.policy.attempt_timeout)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    return Err(StoreError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}; retrying in {:?}",
                        operation, attempt, max_attempts, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for ResilientStore<S> {
    async fn get_latest(&self) -> Result<Option<Record>> {
        self.execute("get_latest", || self.inner.get_latest()).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.execute("get_by_id", || self.inner.get_by_id(id)).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        self.execute("list", || self.inner.list(query)).await
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        self.execute("list_all", || self.inner.list_all()).await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        self.execute("save", || self.inner.save(record.clone())).await
    }
}
