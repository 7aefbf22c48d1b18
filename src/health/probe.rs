//! Single-backend probing.
//!
//! # Responsibilities
//! - Issue one fixed, non-functional call against a backend
//! - Fold the outcome (success, reported failure, transport error) into a
//!   new health record
//!
//! # Design Decisions
//! - Never returns an error: every failure becomes data in the record
//! - Reported latency wins over the locally measured one on success
//! - A transport error carries no latency

use std::sync::Arc;
use std::time::Instant;

use crate::executor::{ExecRequest, Executor};
use crate::health::state::{now_millis, HealthPolicy};
use crate::observability::metrics;
use crate::registry::{Backend, BackendSnapshot, HealthRecord};

/// Runs probes and records their results.
pub struct Prober {
    executor: Arc<dyn Executor>,
    policy: HealthPolicy,
    prompt: String,
}

impl Prober {
    pub fn new(executor: Arc<dyn Executor>, policy: HealthPolicy, prompt: impl Into<String>) -> Self {
        Self {
            executor,
            policy,
            prompt: prompt.into(),
        }
    }

    pub fn policy(&self) -> HealthPolicy {
        self.policy
    }

    /// Probe one backend and publish its new health record.
    pub async fn probe(&self, backend: &Backend) -> BackendSnapshot {
        let request = ExecRequest::probe(backend.provider(), backend.model(), &self.prompt);

        let started = Instant::now();
        let result = self.executor.execute(request).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let checked_at = now_millis();

        let record = match result {
            Ok(outcome) if outcome.ok => {
                let latency = outcome.latency_ms.unwrap_or(elapsed);
                backend.update_health(|_| HealthRecord::success(checked_at, latency))
            }
            Ok(outcome) => {
                let error = outcome
                    .error
                    .unwrap_or_else(|| "probe reported failure".to_string());
                self.fail(backend, checked_at, outcome.latency_ms, error)
            }
            Err(e) => self.fail(backend, checked_at, None, e.to_string()),
        };

        self.observe(backend, &record, checked_at);
        backend.snapshot_with(&record)
    }

    /// Record a failure that happened outside the executor call itself.
    pub fn record_failure(&self, backend: &Backend, error: impl Into<String>) -> BackendSnapshot {
        let checked_at = now_millis();
        let record = self.fail(backend, checked_at, None, error.into());
        self.observe(backend, &record, checked_at);
        backend.snapshot_with(&record)
    }

    fn fail(
        &self,
        backend: &Backend,
        checked_at: u64,
        latency_ms: Option<u64>,
        error: String,
    ) -> Arc<HealthRecord> {
        backend.update_health(|prev| HealthRecord::failure(prev, checked_at, latency_ms, error.clone()))
    }

    fn observe(&self, backend: &Backend, record: &HealthRecord, checked_at: u64) {
        let ok = record.ok == Some(true);
        let healthy = self.policy.is_healthy(record, checked_at);

        if ok {
            tracing::debug!(
                key = %backend.key(),
                latency_ms = ?record.latency_ms,
                healthy,
                "Probe succeeded"
            );
        } else {
            tracing::warn!(
                key = %backend.key(),
                error = record.error.as_deref().unwrap_or_default(),
                consecutive_failures = record.consecutive_failures,
                "Probe failed"
            );
        }

        metrics::record_probe(backend.key(), ok, record.latency_ms);
        metrics::record_backend_health(backend.key(), healthy, record.consecutive_failures);
    }
}
