//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the interview router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Seed set of backends registered at startup, in listing order.
    pub backends: Vec<BackendConfig>,

    /// Health evaluation and probing cadence.
    pub health: HealthConfig,

    /// External agent invocation.
    pub executor: ExecutorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: default_backends(),
            health: HealthConfig::default(),
            executor: ExecutorConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig::new("openai", "gpt-4o-mini"),
        BackendConfig::new("openai", "gpt-4o"),
        BackendConfig::new("anthropic", "claude-3-5-sonnet-latest"),
    ]
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// A backend model endpoint, keyed as `provider:model`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: String,
    pub model: String,
}

impl BackendConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Health configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Run the periodic probe loop.
    pub enabled: bool,

    /// Latency ceiling; slower probes count as unhealthy.
    pub max_latency_ms: u64,

    /// Freshness window; older observations count as unhealthy.
    pub ttl_ms: u64,

    /// Probe cadence in milliseconds.
    pub interval_ms: u64,

    /// Fixed prompt sent with every probe.
    pub probe_prompt: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_latency_ms: 2500,
            ttl_ms: 120_000,
            interval_ms: 300,
            probe_prompt: "Health check ping. Reply OK.".to_string(),
        }
    }
}

/// Agent process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Interpreter used to run the agent script.
    pub program: String,

    /// Agent script passed as the first argument.
    pub script: String,

    /// Upper bound on a single agent call.
    pub timeout_ms: u64,

    /// Working directory for the agent process.
    pub working_dir: Option<String>,

    /// Prompt sent with interview work calls.
    pub interview_prompt: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let program = if cfg!(windows) {
            "../.venv/Scripts/python.exe"
        } else {
            "../.venv/bin/python"
        };
        Self {
            program: program.to_string(),
            script: "../python/llm_agent.py".to_string(),
            timeout_ms: 20_000,
            working_dir: None,
            interview_prompt: "Simulate interview start. Reply READY.".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
