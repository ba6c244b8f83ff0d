//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use serde_json::Value;

use github_stats_metrics::config::AppConfig;
use github_stats_metrics::health::{FixedIntrospector, HealthAggregatorBuilder, SystemSnapshot};
use github_stats_metrics::http::{AppState, HttpServer};
use github_stats_metrics::observability::logging::{LeveledLogger, LogLevel, MemorySink};

pub const ADMIN_KEY: &str = "test-admin-key";

/// Router plus the sink capturing everything the leveled logger emitted.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sink: Arc<MemorySink>,
}

/// A config that passes every probe, with admin routes on.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.github.token = "ghp_test".into();
    config.github.repositories = vec!["octo/repo".into()];
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();
    config
}

pub fn quiet_system() -> SystemSnapshot {
    SystemSnapshot {
        active_workers: 4,
        memory_mb: 24,
        num_cpu: 8,
    }
}

pub fn test_app(config: AppConfig, snapshot: SystemSnapshot) -> TestApp {
    let config = Arc::new(config);
    let sink = Arc::new(MemorySink::new());
    let logger = Arc::new(LeveledLogger::new(
        LogLevel::from_config(&config.logging.level),
        sink.clone(),
    ));
    let health =
        HealthAggregatorBuilder::with_defaults(config.clone(), Arc::new(FixedIntrospector(snapshot)))
            .build();
    let state = AppState::new(config, logger, health);

    TestApp {
        router: HttpServer::build_router(state.clone()),
        state,
        sink,
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
