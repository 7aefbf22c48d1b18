//! Backend health verdict.
//!
//! # Verdict
//! ```text
//! Healthy iff
//!     checked at least once
//!     AND now - last_checked_at <= ttl_ms
//!     AND last probe succeeded
//!     AND (no latency recorded OR latency_ms <= max_latency_ms)
//! ```
//!
//! # Design Decisions
//! - Pure function of the record and the current time; safe to call from any thread
//! - Stale observations count as unhealthy rather than assumed good
//! - No hysteresis: a single probe decides the next verdict

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::HealthConfig;
use crate::registry::HealthRecord;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Decide whether a backend may receive traffic.
pub fn is_healthy(record: &HealthRecord, now: u64, max_latency_ms: u64, ttl_ms: u64) -> bool {
    let Some(checked_at) = record.last_checked_at else {
        return false;
    };
    if now.saturating_sub(checked_at) > ttl_ms {
        return false;
    }
    if record.ok != Some(true) {
        return false;
    }
    match record.latency_ms {
        Some(latency) => latency <= max_latency_ms,
        None => true,
    }
}

/// Process-wide thresholds for the health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub max_latency_ms: u64,
    pub ttl_ms: u64,
}

impl HealthPolicy {
    pub fn new(max_latency_ms: u64, ttl_ms: u64) -> Self {
        Self {
            max_latency_ms,
            ttl_ms,
        }
    }

    pub fn is_healthy(&self, record: &HealthRecord, now: u64) -> bool {
        is_healthy(record, now, self.max_latency_ms, self.ttl_ms)
    }
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::from(&HealthConfig::default())
    }
}

impl From<&HealthConfig> for HealthPolicy {
    fn from(config: &HealthConfig) -> Self {
        Self::new(config.max_latency_ms, config.ttl_ms)
    }
}
