//! Built-in probes: configuration validity and system resources.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::health::check::{HealthCheck, HealthState, HealthStatus, ProbeContext};
use crate::health::system::{SystemIntrospector, SystemSnapshot};

/// Memory above this many MiB puts the system probe into warning.
pub const MEMORY_WARN_MB: u64 = 100;

/// More live workers than this puts the system probe into warning.
pub const WORKER_WARN_COUNT: usize = 100;

/// Verifies the GitHub credential and target repositories are configured.
pub struct ConfigHealthCheck {
    config: Arc<AppConfig>,
}

impl ConfigHealthCheck {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl HealthCheck for ConfigHealthCheck {
    fn name(&self) -> &str {
        "config"
    }

    async fn check(&self, _ctx: &ProbeContext) -> HealthStatus {
        if self.config.github.token.is_empty() {
            return HealthStatus::unhealthy("GitHub token not configured");
        }

        if self.config.github.repositories.is_empty() {
            return HealthStatus::unhealthy("No target repositories configured");
        }

        HealthStatus::healthy()
            .with_detail("repositories_count", self.config.github.repositories.len())
            .with_detail("log_level", self.config.logging.level.clone())
    }
}

/// Flags high memory use or an unusually large number of live workers.
pub struct SystemHealthCheck {
    introspector: Arc<dyn SystemIntrospector>,
}

impl SystemHealthCheck {
    pub fn new(introspector: Arc<dyn SystemIntrospector>) -> Self {
        Self { introspector }
    }
}

#[async_trait]
impl HealthCheck for SystemHealthCheck {
    fn name(&self) -> &str {
        "system"
    }

    async fn check(&self, _ctx: &ProbeContext) -> HealthStatus {
        assess_system(
            &self.introspector.snapshot(),
            &self.introspector.runtime_version(),
        )
    }
}

/// Apply the resource thresholds to a snapshot.
pub fn assess_system(snapshot: &SystemSnapshot, runtime_version: &str) -> HealthStatus {
    let mut breaches = Vec::new();

    if snapshot.memory_mb > MEMORY_WARN_MB {
        breaches.push(format!("High memory usage: {}MB", snapshot.memory_mb));
    }
    if snapshot.active_workers > WORKER_WARN_COUNT {
        breaches.push(format!("High worker count: {}", snapshot.active_workers));
    }

    let status = if breaches.is_empty() {
        HealthState::Healthy
    } else {
        HealthState::Warning
    };

    HealthStatus {
        status,
        message: (!breaches.is_empty()).then(|| breaches.join(", ")),
        details: None,
    }
    .with_detail("memory_mb", snapshot.memory_mb)
    .with_detail("workers", snapshot.active_workers)
    .with_detail("num_cpu", snapshot.num_cpu)
    .with_detail("runtime_version", runtime_version)
}
