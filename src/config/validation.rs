//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (durations > 0, bind address parses)
//! - Detect duplicate backend keys in the seed set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::registry::backend_key;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("backend #{index} has an empty provider or model")]
    EmptyBackend { index: usize },

    #[error("duplicate backend key {0:?}")]
    DuplicateBackend(String),

    #[error("executor program must not be empty")]
    EmptyProgram,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let durations = [
        ("health.max_latency_ms", config.health.max_latency_ms),
        ("health.ttl_ms", config.health.ttl_ms),
        ("health.interval_ms", config.health.interval_ms),
        ("executor.timeout_ms", config.executor.timeout_ms),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::NonPositive { field });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.executor.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram);
    }

    let mut seen = HashSet::new();
    for (index, backend) in config.backends.iter().enumerate() {
        if backend.provider.trim().is_empty() || backend.model.trim().is_empty() {
            errors.push(ValidationError::EmptyBackend { index });
            continue;
        }
        let key = backend_key(&backend.provider, &backend.model);
        if !seen.insert(key.clone()) {
            errors.push(ValidationError::DuplicateBackend(key));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RouterConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RouterConfig::default();
        config.health.ttl_ms = 0;
        config.listener.bind_address = "not-an-address".into();
        config.backends.push(BackendConfig::new("openai", "gpt-4o"));
        config.backends.push(BackendConfig::new("", "orphan"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NonPositive { field: "health.ttl_ms" },
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::DuplicateBackend("openai:gpt-4o".into()),
                ValidationError::EmptyBackend { index: 4 },
            ]
        );
    }
}
