//! Configuration loading from disk or the process environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from environment variables.
pub fn from_env() -> Result<AppConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build configuration from an arbitrary variable lookup, starting from defaults.
pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let mut config = AppConfig::default();

    if let Some(token) = get("GITHUB_TOKEN") {
        config.github.token = token;
    }
    if let Some(repos) = get("GITHUB_GRAPHQL_SEARCH_QUERY_TARGET_REPOSITORIES") {
        config.github.repositories = split_list(&repos);
    }
    if let Some(value) = get("GITHUB_API_TIMEOUT") {
        config.github.timeout_secs = parse_secs("GITHUB_API_TIMEOUT", &value)?;
    }

    if let Some(value) = get("SERVER_PORT") {
        let port: u16 = value.trim().parse().map_err(|_| ConfigError::Env {
            var: "SERVER_PORT",
            reason: format!("{} is not a port number", value),
        })?;
        if port == 0 {
            return Err(ConfigError::Env {
                var: "SERVER_PORT",
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        config.server.bind_address = format!("0.0.0.0:{}", port);
    }
    // READ/WRITE are the older per-direction knobs; the longer one bounds
    // the whole request unless SERVER_REQUEST_TIMEOUT is set.
    let mut legacy_timeout = None;
    for var in ["SERVER_READ_TIMEOUT", "SERVER_WRITE_TIMEOUT"] {
        if let Some(value) = get(var) {
            let secs = parse_secs(var, &value)?;
            legacy_timeout = Some(legacy_timeout.map_or(secs, |t: u64| t.max(secs)));
        }
    }
    if let Some(secs) = legacy_timeout {
        config.server.request_timeout_secs = secs;
    }
    if let Some(value) = get("SERVER_REQUEST_TIMEOUT") {
        config.server.request_timeout_secs = parse_secs("SERVER_REQUEST_TIMEOUT", &value)?;
    }
    if let Some(value) = get("SERVER_SHUTDOWN_TIMEOUT") {
        config.server.shutdown_timeout_secs = parse_secs("SERVER_SHUTDOWN_TIMEOUT", &value)?;
    }

    if let Some(origins) = get("ALLOWED_ORIGINS") {
        config.security.allowed_origins = split_list(&origins);
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level.trim().to_ascii_uppercase();
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.logging.format = format.trim().to_ascii_uppercase();
    }

    if let Some(value) = get("HEALTH_CHECK_TIMEOUT") {
        config.health.timeout_secs = parse_secs("HEALTH_CHECK_TIMEOUT", &value)?;
    }

    if let Some(value) = get("METRICS_ENABLED") {
        config.observability.metrics_enabled = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => {
                return Err(ConfigError::Env {
                    var: "METRICS_ENABLED",
                    reason: format!("{} is not a boolean", other),
                })
            }
        };
    }
    if let Some(addr) = get("METRICS_ADDRESS") {
        config.observability.metrics_address = addr;
    }

    if let Some(key) = get("ADMIN_API_KEY") {
        config.admin.enabled = true;
        config.admin.api_key = key;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a bare number of seconds (`"30"`) or a duration string (`"1m30s"`,
/// `"500ms"`) into whole seconds, rounding sub-second remainders up.
fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    let trimmed = value.trim();
    let duration = match trimmed.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(trimmed).map_err(|e| ConfigError::Env {
            var,
            reason: format!("{} is not a duration: {}", value, e),
        })?,
    };

    let secs = duration.as_secs();
    Ok(if duration.subsec_nanos() > 0 { secs + 1 } else { secs })
}
