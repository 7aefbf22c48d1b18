//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RouterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RouterConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the process environment on top of a loaded configuration.
///
/// `lookup` abstracts the environment so tests do not mutate process state.
pub fn apply_env_overrides<F>(config: &mut RouterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let parse_ms = |var: &'static str| -> Result<Option<u64>, ConfigError> {
        match lookup(var) {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Env { var, value }),
            None => Ok(None),
        }
    };

    if let Some(ms) = parse_ms("HEALTH_MAX_LATENCY_MS")? {
        config.health.max_latency_ms = ms;
    }
    if let Some(ms) = parse_ms("HEALTH_TTL_MS")? {
        config.health.ttl_ms = ms;
    }
    if let Some(ms) = parse_ms("HEALTH_CHECK_INTERVAL_MS")? {
        config.health.interval_ms = ms;
    }

    if let Some(value) = lookup("PORT") {
        let port: u16 = value.trim().parse().map_err(|_| ConfigError::Env {
            var: "PORT",
            value: value.clone(),
        })?;
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
