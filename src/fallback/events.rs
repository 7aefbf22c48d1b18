//! Fallback audit log.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Why a resolution did not simply use the primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoHealthyModel,
    PrimaryUnhealthy,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NoHealthyModel => "no_healthy_model",
            FallbackReason::PrimaryUnhealthy => "primary_unhealthy",
        }
    }
}

/// Where the fallback candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackSource {
    /// Supplied with the request.
    Caller,
    /// Every other registered backend, in registry order.
    Auto,
}

impl FallbackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackSource::Caller => "caller",
            FallbackSource::Auto => "auto",
        }
    }
}

/// Audit record of a resolution that did not land on a healthy primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEvent {
    /// Epoch milliseconds.
    pub timestamp: u64,
    pub simulation_id: String,
    pub primary: String,
    pub chosen: Option<String>,
    pub reason: FallbackReason,
    pub fallback_source: FallbackSource,
}

/// Append-only, operator-clearable event list.
#[derive(Debug, Default)]
pub struct FallbackLog {
    events: Mutex<Vec<FallbackEvent>>,
}

impl FallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: FallbackEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Copy of all events in insertion order.
    pub fn list(&self) -> Vec<FallbackEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop every event, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = events.len();
        events.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> FallbackEvent {
        FallbackEvent {
            timestamp: 1,
            simulation_id: id.into(),
            primary: "openai:gpt-4o".into(),
            chosen: None,
            reason: FallbackReason::NoHealthyModel,
            fallback_source: FallbackSource::Auto,
        }
    }

    #[test]
    fn test_append_list_clear() {
        let log = FallbackLog::new();
        log.append(event("sim-1"));
        log.append(event("sim-2"));

        let ids: Vec<_> = log.list().into_iter().map(|e| e.simulation_id).collect();
        assert_eq!(ids, vec!["sim-1", "sim-2"]);

        assert_eq!(log.clear(), 2);
        assert!(log.is_empty());
        assert_eq!(log.clear(), 0);
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(event("sim-9")).unwrap();
        assert_eq!(json["simulationId"], "sim-9");
        assert_eq!(json["reason"], "no_healthy_model");
        assert_eq!(json["fallbackSource"], "auto");
        assert!(json["chosen"].is_null());
    }
}
