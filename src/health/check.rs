//! Probe contract and per-probe result types.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Warning,
    Unhealthy,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Warning => "warning",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one probe as rendered under `checks.<name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: HealthState::Healthy,
            message: None,
            details: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Warning,
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthState::Unhealthy,
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Deadline shared by every probe in one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext {
    deadline: Instant,
}

impl ProbeContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Run `fut` until the deadline. `None` means the deadline passed first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::time::timeout_at(self.deadline, fut).await.ok()
    }
}

/// A named, independently pluggable health probe.
///
/// Implementations must return promptly once the context deadline passes;
/// the aggregator does not abort a probe that ignores it.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, ctx: &ProbeContext) -> HealthStatus;
}

/// Adapts an async closure into a `HealthCheck`.
pub struct FnCheck<F> {
    name: String,
    f: F,
}

impl<F> FnCheck<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> HealthCheck for FnCheck<F>
where
    F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HealthStatus> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, ctx: &ProbeContext) -> HealthStatus {
        (self.f)(*ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_lowercase_and_skips_empty() {
        let rendered = serde_json::to_value(HealthStatus::healthy()).unwrap();
        assert_eq!(rendered, json!({"status": "healthy"}));

        let rendered = serde_json::to_value(
            HealthStatus::warning("High memory usage: 150MB").with_detail("memory_mb", 150),
        )
        .unwrap();
        assert_eq!(
            rendered,
            json!({"status": "warning", "message": "High memory usage: 150MB", "details": {"memory_mb": 150}})
        );
    }

    #[tokio::test]
    async fn fn_check_runs_closure() {
        let check = FnCheck::new("db", |_ctx| async { HealthStatus::unhealthy("down") });
        assert_eq!(check.name(), "db");
        let status = check.check(&ProbeContext::with_timeout(Duration::from_secs(1))).await;
        assert_eq!(status.status, HealthState::Unhealthy);
    }

    #[tokio::test]
    async fn context_run_stops_at_deadline() {
        let ctx = ProbeContext::with_timeout(Duration::from_millis(20));
        let outcome = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(outcome.is_none());
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }
}
