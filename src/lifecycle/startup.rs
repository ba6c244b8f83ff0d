//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration from a file or the environment
//! - Initialize subsystems in dependency order
//! - Start the metrics exporter when enabled
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Probes are registered here, before the aggregator is shared

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::{self, AppConfig, ConfigError, ObservabilityConfig};
use crate::health::{HealthAggregatorBuilder, RuntimeIntrospector, SystemIntrospector};
use crate::http::server::AppState;
use crate::observability::logging::{LeveledLogger, LogLevel};
use crate::observability::metrics;

/// Load from `path` when given, otherwise from the environment, then apply
/// a CLI log level override.
pub fn load(path: Option<&Path>, level_override: Option<LogLevel>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => config::load_config(path)?,
        None => config::from_env()?,
    };
    if let Some(level) = level_override {
        config.logging.level = level.as_str().to_string();
    }
    Ok(config)
}

/// Wire the logger, probes and responder around a loaded config.
pub fn build_state(config: AppConfig) -> AppState {
    let config = Arc::new(config);
    let logger = Arc::new(LeveledLogger::from_config(
        &config.logging,
        &config.health.service_name,
        &config.health.version,
    ));
    let introspector: Arc<dyn SystemIntrospector> = Arc::new(RuntimeIntrospector::new());
    let health = HealthAggregatorBuilder::with_defaults(config.clone(), introspector).build();

    tracing::info!(
        checks = ?health.check_names(),
        timeout_secs = health.timeout().as_secs(),
        "Health checks registered"
    );

    AppState::new(config, logger, health)
}

/// Install the Prometheus exporter if the config asks for it.
pub fn start_metrics(config: &ObservabilityConfig) {
    if !config.metrics_enabled {
        return;
    }
    match config.metrics_address.parse::<SocketAddr>() {
        Ok(addr) => metrics::init_metrics(addr),
        Err(e) => tracing::error!(
            metrics_address = %config.metrics_address,
            error = %e,
            "Failed to parse metrics address"
        ),
    }
}
