//! Fallback selection.
//!
//! # Responsibilities
//! - Build the candidate list: primary, then caller fallbacks or every
//!   other registered key
//! - Pick the first candidate that exists and is healthy right now
//! - Log an event whenever the primary is not the one chosen
//!
//! # Design Decisions
//! - First healthy in declared order wins; no scoring or load balancing
//! - Reads whatever health state exists; never triggers a probe
//! - Exhaustion is an explicit error, never a silent unhealthy pick

use serde::Serialize;
use std::sync::Arc;

use crate::error::{RouterError, RouterResult};
use crate::fallback::events::{FallbackEvent, FallbackLog, FallbackReason, FallbackSource};
use crate::health::state::{now_millis, HealthPolicy};
use crate::observability::metrics;
use crate::registry::Registry;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub chosen: String,
    pub used_fallback: bool,
    pub fallback_source: FallbackSource,
}

/// Resolves a primary key plus fallbacks to one healthy backend.
#[derive(Debug, Clone)]
pub struct FallbackSelector {
    registry: Arc<Registry>,
    policy: HealthPolicy,
    log: Arc<FallbackLog>,
}

impl FallbackSelector {
    pub fn new(registry: Arc<Registry>, policy: HealthPolicy, log: Arc<FallbackLog>) -> Self {
        Self {
            registry,
            policy,
            log,
        }
    }

    pub fn log(&self) -> &Arc<FallbackLog> {
        &self.log
    }

    /// Resolve against the health state as of now.
    pub fn resolve(
        &self,
        simulation_id: &str,
        primary: &str,
        caller_fallbacks: &[String],
    ) -> RouterResult<Resolution> {
        self.resolve_at(simulation_id, primary, caller_fallbacks, now_millis())
    }

    /// Resolve against the health state as of `now` (epoch ms).
    pub fn resolve_at(
        &self,
        simulation_id: &str,
        primary: &str,
        caller_fallbacks: &[String],
        now: u64,
    ) -> RouterResult<Resolution> {
        let (candidates, source) = self.candidates(primary, caller_fallbacks);

        let chosen = candidates.into_iter().find(|key| {
            self.registry
                .get(key)
                .map(|backend| self.policy.is_healthy(&backend.health(), now))
                .unwrap_or(false)
        });

        let Some(chosen) = chosen else {
            tracing::warn!(
                simulation_id,
                primary,
                fallback_source = source.as_str(),
                "No healthy model available"
            );
            self.record(simulation_id, primary, None, FallbackReason::NoHealthyModel, source, now);
            metrics::record_resolution("unavailable");
            return Err(RouterError::Unavailable {
                simulation_id: simulation_id.to_string(),
            });
        };

        let used_fallback = chosen != primary;
        if used_fallback {
            tracing::info!(
                simulation_id,
                primary,
                chosen = %chosen,
                fallback_source = source.as_str(),
                "Primary unhealthy, using fallback"
            );
            self.record(
                simulation_id,
                primary,
                Some(chosen.clone()),
                FallbackReason::PrimaryUnhealthy,
                source,
                now,
            );
            metrics::record_resolution("fallback");
        } else {
            metrics::record_resolution("primary");
        }

        Ok(Resolution {
            chosen,
            used_fallback,
            fallback_source: source,
        })
    }

    /// Ordered candidates and where the fallbacks came from.
    pub fn candidates(&self, primary: &str, caller_fallbacks: &[String]) -> (Vec<String>, FallbackSource) {
        let mut candidates = vec![primary.to_string()];
        if caller_fallbacks.is_empty() {
            candidates.extend(self.registry.list_keys().into_iter().filter(|k| k != primary));
            (candidates, FallbackSource::Auto)
        } else {
            candidates.extend(caller_fallbacks.iter().cloned());
            (candidates, FallbackSource::Caller)
        }
    }

    fn record(
        &self,
        simulation_id: &str,
        primary: &str,
        chosen: Option<String>,
        reason: FallbackReason,
        source: FallbackSource,
        now: u64,
    ) {
        self.log.append(FallbackEvent {
            timestamp: now,
            simulation_id: simulation_id.to_string(),
            primary: primary.to_string(),
            chosen,
            reason,
            fallback_source: source,
        });
        metrics::record_fallback(reason.as_str(), source.as_str());
    }
}
