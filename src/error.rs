//! Error types shared across the router.
//!
//! Probe-level failures never show up here: they are absorbed into a
//! backend's health record. Only registry and resolution failures surface
//! to callers.

use thiserror::Error;

/// Errors raised by the execution collaborator.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The agent process could not be started.
    #[error("failed to spawn agent: {0}")]
    Spawn(#[source] std::io::Error),

    /// The agent exited with a non-zero status.
    #[error("agent exit {code}: {output}")]
    Exit { code: i32, output: String },

    /// The agent's stdout was not a valid outcome document.
    #[error("bad json from agent: {0}")]
    Decode(String),

    /// The call did not complete within the configured deadline.
    #[error("agent call timed out after {0} ms")]
    Timeout(u64),

    /// Reading the agent's output failed.
    #[error("agent io error: {0}")]
    Io(#[source] std::io::Error),
}

/// Caller-visible router errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A referenced backend key does not exist.
    #[error("unknown model key: {0}")]
    NotFound(String),

    /// Attempted re-registration of an existing key.
    #[error("model key already registered: {0}")]
    DuplicateKey(String),

    /// No candidate was healthy at resolution time.
    #[error("No healthy model available")]
    Unavailable { simulation_id: String },

    /// The request was malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// A work call to the chosen backend failed in transport.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
