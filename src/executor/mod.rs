//! Execution collaborator interface.
//!
//! # Data Flow
//! ```text
//! health prober / interview handler
//!     → Executor::execute(ExecRequest)
//!         → process.rs (spawn agent, wait with deadline, parse stdout JSON)
//!     → ExecOutcome { ok, latency_ms?, error?, ...extra }
//!       or ExecutorError (transport failure)
//! ```
//!
//! # Design Decisions
//! - The call is a black box; only ok/latency/error are interpreted
//! - Anything the agent adds beyond those fields is passed through untouched
//! - Tests substitute their own `Executor` instead of spawning processes

pub mod process;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExecutorError;

pub use process::ProcessExecutor;

/// Kind of call made against a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecKind {
    /// Connectivity/latency check with a fixed prompt.
    Probe,
    /// Actual work for a routed request.
    Interview,
}

impl ExecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecKind::Probe => "probe",
            ExecKind::Interview => "interview",
        }
    }
}

/// One call to the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecRequest {
    pub kind: ExecKind,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    /// Request payload forwarded verbatim on work calls.
    pub config: Option<serde_json::Value>,
}

impl ExecRequest {
    pub fn probe(provider: &str, model: &str, prompt: &str) -> Self {
        Self {
            kind: ExecKind::Probe,
            provider: provider.to_string(),
            model: model.to_string(),
            prompt: prompt.to_string(),
            config: None,
        }
    }

    pub fn interview(
        provider: &str,
        model: &str,
        prompt: &str,
        config: serde_json::Value,
    ) -> Self {
        Self {
            kind: ExecKind::Interview,
            provider: provider.to_string(),
            model: model.to_string(),
            prompt: prompt.to_string(),
            config: Some(config),
        }
    }
}

/// Structured answer from the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecOutcome {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExecOutcome {
    pub fn success(latency_ms: Option<u64>) -> Self {
        Self {
            ok: true,
            latency_ms,
            ..Self::default()
        }
    }

    pub fn failure(latency_ms: Option<u64>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            latency_ms,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Capability to run a call against a backend.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: ExecRequest) -> Result<ExecOutcome, ExecutorError>;
}
