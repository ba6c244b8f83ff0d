//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// GitHub API credentials and target repositories.
    pub github: GitHubConfig,

    /// Listener and request handling settings.
    pub server: ServerConfig,

    /// Cross-origin allow-list.
    pub security: SecurityConfig,

    /// Leveled logger settings.
    pub logging: LoggingConfig,

    /// Health endpoint settings.
    pub health: HealthConfig,

    /// Metrics exporter settings.
    pub observability: ObservabilityConfig,

    /// Runtime administration endpoints.
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Repository names with surrounding whitespace removed.
    pub fn clean_repositories(&self) -> Vec<String> {
        self.github
            .repositories
            .iter()
            .map(|r| r.trim().to_string())
            .collect()
    }

    pub fn is_debug_mode(&self) -> bool {
        self.logging.level.eq_ignore_ascii_case("DEBUG")
    }
}

/// GitHub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API token. Never logged or exposed by probes.
    #[serde(skip_serializing)]
    pub token: String,

    /// Target repositories in `owner/repo` form.
    pub repositories: Vec<String>,

    /// API request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            repositories: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 15,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Origins allowed by the CORS middleware (exact match).
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (DEBUG, INFO, WARN, ERROR).
    pub level: String,

    /// Line format (TEXT, JSON).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: "TEXT".to_string(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Deadline handed to every probe, in seconds.
    pub timeout_secs: u64,

    /// Service name reported in the health response.
    pub service_name: String,

    /// Service version reported in the health response.
    pub version: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            service_name: "github-stats-metrics".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Scrape endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount `/admin/*` routes.
    pub enabled: bool,

    /// Bearer token required by admin routes.
    #[serde(skip_serializing)]
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.health.timeout_secs, 5);
        assert_eq!(config.logging.level, "INFO");
        assert_eq!(config.security.allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.github.token.is_empty());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [github]
            token = "t"
            repositories = ["octo/repo"]

            [logging]
            level = "WARN"
            "#,
        )
        .unwrap();
        assert_eq!(config.github.repositories, vec!["octo/repo"]);
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.logging.format, "TEXT");
    }

    #[test]
    fn token_is_not_serialized() {
        let mut config = AppConfig::default();
        config.github.token = "secret-token".into();
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn clean_repositories_trims() {
        let mut config = AppConfig::default();
        config.github.repositories = vec![" a/b".into(), "c/d ".into()];
        assert_eq!(config.clean_repositories(), vec!["a/b", "c/d"]);
    }
}
