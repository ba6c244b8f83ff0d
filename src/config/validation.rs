//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate repository names, log level and format, timeouts, addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - A missing token or empty repository list is not a validation failure;
//!   the config health probe reports it instead

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::observability::logging::{LogFormat, LogLevel};

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid repository format: {0} (should be owner/repo)")]
    RepositoryFormat(String),

    #[error("invalid log level: {0} (valid: DEBUG, INFO, WARN, ERROR)")]
    LogLevel(String),

    #[error("invalid log format: {0} (valid: JSON, TEXT)")]
    LogFormat(String),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("invalid {field}: {value}")]
    Address { field: &'static str, value: String },

    #[error("admin.api_key is required when admin routes are enabled")]
    MissingAdminKey,
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for repo in config.clean_repositories() {
        if !repo.contains('/') {
            errors.push(ValidationError::RepositoryFormat(repo));
        }
    }

    if config.logging.level.parse::<LogLevel>().is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    if config.logging.format.parse::<LogFormat>().is_err() {
        errors.push(ValidationError::LogFormat(config.logging.format.clone()));
    }

    let timeouts = [
        ("github.timeout_secs", config.github.timeout_secs),
        ("server.request_timeout_secs", config.server.request_timeout_secs),
        ("health.timeout_secs", config.health.timeout_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled && config.admin.api_key.is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
