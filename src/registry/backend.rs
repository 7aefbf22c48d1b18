//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single provider+model endpoint
//! - Hold the latest health observation for that endpoint
//!
//! # Design Decisions
//! - Identity fields are immutable after registration
//! - The health record is replaced as a whole through `ArcSwap`, so readers
//!   always see a complete observation and never a half-written one

use arc_swap::{ArcSwap, Guard};
use serde::Serialize;
use std::sync::Arc;

/// Build the composite registry key for a provider+model pair.
pub fn backend_key(provider: &str, model: &str) -> String {
    format!("{}:{}", provider, model)
}

/// The result of the most recent probe against a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    /// Completion time of the last probe in epoch milliseconds, `None` if never probed.
    pub last_checked_at: Option<u64>,
    /// Last probe outcome; `None` until the first probe completes.
    pub ok: Option<bool>,
    /// Latency of the last probe, if one was measured.
    pub latency_ms: Option<u64>,
    /// Error message from the last failed probe.
    pub error: Option<String>,
    /// Failed probes since the last success.
    pub consecutive_failures: u32,
}

impl HealthRecord {
    /// Record following a successful probe.
    pub fn success(checked_at: u64, latency_ms: u64) -> Self {
        Self {
            last_checked_at: Some(checked_at),
            ok: Some(true),
            latency_ms: Some(latency_ms),
            error: None,
            consecutive_failures: 0,
        }
    }

    /// Record following a failed probe, carrying the failure streak forward.
    pub fn failure(
        previous: &HealthRecord,
        checked_at: u64,
        latency_ms: Option<u64>,
        error: String,
    ) -> Self {
        Self {
            last_checked_at: Some(checked_at),
            ok: Some(false),
            latency_ms,
            error: Some(error),
            consecutive_failures: previous.consecutive_failures.saturating_add(1),
        }
    }
}

/// A single backend model endpoint.
#[derive(Debug)]
pub struct Backend {
    key: String,
    provider: String,
    model: String,
    health: ArcSwap<HealthRecord>,
}

impl Backend {
    /// Create an unprobed backend.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        let provider = provider.into();
        let model = model.into();
        Self {
            key: backend_key(&provider, &model),
            provider,
            model,
            health: ArcSwap::from_pointee(HealthRecord::default()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Current health record.
    pub fn health(&self) -> Arc<HealthRecord> {
        self.health.load_full()
    }

    /// Replace the health record unconditionally.
    pub fn set_health(&self, record: HealthRecord) {
        self.health.store(Arc::new(record));
    }

    /// Derive a new record from the current one and publish it in one swap.
    ///
    /// `f` may run more than once if another writer races this one.
    pub fn update_health<F>(&self, f: F) -> Arc<HealthRecord>
    where
        F: Fn(&HealthRecord) -> HealthRecord,
    {
        let mut current = self.health.load_full();
        loop {
            let next = Arc::new(f(&current));
            let previous = self.health.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&*previous, &current) {
                return next;
            }
            current = Guard::into_inner(previous);
        }
    }

    /// Point-in-time view of identity plus health.
    pub fn snapshot(&self) -> BackendSnapshot {
        self.snapshot_with(&self.health())
    }

    /// View of identity paired with a specific health record.
    pub fn snapshot_with(&self, health: &HealthRecord) -> BackendSnapshot {
        BackendSnapshot {
            key: self.key.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            health: health.clone(),
        }
    }
}

/// Serializable view of a backend at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSnapshot {
    pub key: String,
    pub provider: String,
    pub model: String,
    #[serde(flatten)]
    pub health: HealthRecord,
}
