//! Probe registry and sequential evaluation.
//!
//! # Responsibilities
//! - Collect probes at startup, keyed by name
//! - Run every probe in registration order against one shared deadline
//! - Merge the results into a single overall status and transport code
//!
//! # Design Decisions
//! - Registration happens on a builder; the built aggregator is immutable,
//!   so probes cannot be added while requests are being served
//! - Overall status is healthy only if every probe is exactly healthy.
//!   A warning probe makes the whole service unhealthy (503); there is no
//!   intermediate overall state
//! - A probe that ignores its deadline stalls the response; the aggregator
//!   does not abort it

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::health::check::{FnCheck, HealthCheck, HealthState, HealthStatus, ProbeContext};
use crate::health::probes::{ConfigHealthCheck, SystemHealthCheck};
use crate::health::system::SystemIntrospector;
use crate::observability::metrics;

/// Deadline handed to probes when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Aggregate status reported at the top of the health response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

/// Resource counters attached to every health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub runtime_version: String,
    pub active_workers: usize,
    pub num_cpu: usize,
    pub memory_mb: u64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallHealthResponse {
    pub status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
    pub uptime: String,
    pub system: SystemInfo,
    pub checks: BTreeMap<String, HealthStatus>,
}

impl OverallHealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }

    /// 200 when healthy, 503 otherwise.
    pub fn status_code(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Healthy iff every probe reported exactly healthy.
pub fn overall_status<'a, I>(statuses: I) -> OverallStatus
where
    I: IntoIterator<Item = &'a HealthStatus>,
{
    if statuses.into_iter().all(|s| s.status == HealthState::Healthy) {
        OverallStatus::Healthy
    } else {
        OverallStatus::Unhealthy
    }
}

/// Collects probes before the aggregator starts serving.
pub struct HealthAggregatorBuilder {
    checks: Vec<Arc<dyn HealthCheck>>,
    introspector: Arc<dyn SystemIntrospector>,
    service: String,
    version: String,
    timeout: Duration,
}

impl HealthAggregatorBuilder {
    pub fn new(introspector: Arc<dyn SystemIntrospector>) -> Self {
        Self {
            checks: Vec::new(),
            introspector,
            service: "github-stats-metrics".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Builder preloaded with the config and system probes.
    pub fn with_defaults(config: Arc<AppConfig>, introspector: Arc<dyn SystemIntrospector>) -> Self {
        let mut builder = Self::new(introspector.clone())
            .service(config.health.service_name.clone())
            .version(config.health.version.clone())
            .timeout(Duration::from_secs(config.health.timeout_secs));
        builder
            .register_check(ConfigHealthCheck::new(config))
            .register_check(SystemHealthCheck::new(introspector));
        builder
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Insert a probe by name. Re-registering a name replaces the earlier
    /// probe in place.
    pub fn register_check(&mut self, check: impl HealthCheck + 'static) -> &mut Self {
        self.register_arc(Arc::new(check))
    }

    pub fn register_arc(&mut self, check: Arc<dyn HealthCheck>) -> &mut Self {
        match self.checks.iter_mut().find(|c| c.name() == check.name()) {
            Some(existing) => *existing = check,
            None => self.checks.push(check),
        }
        self
    }

    /// Register an async closure as a probe.
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HealthStatus> + Send + 'static,
    {
        self.register_check(FnCheck::new(name, f))
    }

    pub fn build(self) -> HealthAggregator {
        HealthAggregator {
            checks: self.checks,
            introspector: self.introspector,
            service: self.service,
            version: self.version,
            timeout: self.timeout,
            started_at: Instant::now(),
        }
    }
}

/// Immutable probe registry shared by every health request.
pub struct HealthAggregator {
    checks: Vec<Arc<dyn HealthCheck>>,
    introspector: Arc<dyn SystemIntrospector>,
    service: String,
    version: String,
    timeout: Duration,
    started_at: Instant,
}

impl fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("service", &self.service)
            .field("version", &self.version)
            .field("checks", &self.check_names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HealthAggregator {
    pub fn builder(introspector: Arc<dyn SystemIntrospector>) -> HealthAggregatorBuilder {
        HealthAggregatorBuilder::new(introspector)
    }

    /// Registered probe names in evaluation order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluate every probe with the configured deadline.
    pub async fn check_health(&self) -> OverallHealthResponse {
        self.evaluate(&ProbeContext::with_timeout(self.timeout)).await
    }

    /// Run every probe sequentially against `ctx` and merge the results.
    pub async fn evaluate(&self, ctx: &ProbeContext) -> OverallHealthResponse {
        let mut checks = BTreeMap::new();

        for check in &self.checks {
            let status = check.check(ctx).await;
            metrics::record_health_check(check.name(), status.status);
            if !status.is_healthy() {
                tracing::warn!(
                    check = %check.name(),
                    status = %status.status,
                    detail = status.message.as_deref().unwrap_or(""),
                    "Health check not healthy"
                );
            }
            checks.insert(check.name().to_string(), status);
        }

        let snapshot = self.introspector.snapshot();
        let system = SystemInfo {
            runtime_version: self.introspector.runtime_version(),
            active_workers: snapshot.active_workers,
            num_cpu: snapshot.num_cpu,
            memory_mb: snapshot.memory_mb,
        };

        OverallHealthResponse {
            status: overall_status(checks.values()),
            timestamp: Utc::now(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime: format_uptime(self.started_at.elapsed()),
            system,
            checks,
        }
    }
}

/// Human-readable duration, e.g. `1h2m3.5s`, `4m0s`, `250ms`.
pub fn format_uptime(uptime: Duration) -> String {
    let total_ms = uptime.as_millis();
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if millis == 0 {
        out.push_str(&format!("{}s", seconds));
    } else {
        let frac = format!("{:03}", millis);
        out.push_str(&format!("{}.{}s", seconds, frac.trim_end_matches('0')));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::system::{FixedIntrospector, SystemSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn introspector() -> Arc<dyn SystemIntrospector> {
        Arc::new(FixedIntrospector(SystemSnapshot {
            active_workers: 3,
            memory_mb: 12,
            num_cpu: 8,
        }))
    }

    fn fixed(state: HealthState) -> impl Fn(ProbeContext) -> std::future::Ready<HealthStatus> {
        move |_| {
            std::future::ready(HealthStatus {
                status: state,
                message: None,
                details: None,
            })
        }
    }

    #[tokio::test]
    async fn all_healthy_is_200() {
        let mut builder = HealthAggregator::builder(introspector());
        builder
            .register_fn("a", fixed(HealthState::Healthy))
            .register_fn("b", fixed(HealthState::Healthy));
        let health = builder.build().check_health().await;

        assert_eq!(health.status, OverallStatus::Healthy);
        assert_eq!(health.status_code(), StatusCode::OK);
        assert_eq!(health.checks.len(), 2);
    }

    #[tokio::test]
    async fn warning_demotes_overall_but_is_kept_per_probe() {
        let mut builder = HealthAggregator::builder(introspector());
        builder
            .register_fn("a", fixed(HealthState::Healthy))
            .register_fn("b", fixed(HealthState::Warning));
        let health = builder.build().check_health().await;

        assert_eq!(health.status, OverallStatus::Unhealthy);
        assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health.checks["b"].status, HealthState::Warning);
        assert_eq!(health.checks["a"].status, HealthState::Healthy);
    }

    #[tokio::test]
    async fn unhealthy_probe_is_503() {
        let mut builder = HealthAggregator::builder(introspector());
        builder.register_fn("a", fixed(HealthState::Unhealthy));
        let health = builder.build().check_health().await;
        assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn no_probes_is_healthy() {
        let health = HealthAggregator::builder(introspector()).build().check_health().await;
        assert!(health.is_healthy());
        assert!(health.checks.is_empty());
    }

    #[tokio::test]
    async fn reregistering_replaces_in_place() {
        let mut builder = HealthAggregator::builder(introspector());
        builder
            .register_fn("a", fixed(HealthState::Unhealthy))
            .register_fn("b", fixed(HealthState::Healthy))
            .register_fn("a", fixed(HealthState::Healthy));
        let aggregator = builder.build();

        assert_eq!(aggregator.check_names(), vec!["a", "b"]);
        assert!(aggregator.check_health().await.is_healthy());
    }

    #[tokio::test]
    async fn probes_run_sequentially_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let running = Arc::new(AtomicUsize::new(0));
        let mut builder = HealthAggregator::builder(introspector());

        for name in ["first", "second", "third"] {
            let order = order.clone();
            let running = running.clone();
            builder.register_fn(name, move |_| {
                let order = order.clone();
                let running = running.clone();
                async move {
                    assert_eq!(running.fetch_add(1, Ordering::SeqCst), 0);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    order.lock().unwrap().push(name);
                    running.fetch_sub(1, Ordering::SeqCst);
                    HealthStatus::healthy()
                }
            });
        }

        builder.build().check_health().await;
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn probes_share_one_deadline() {
        let mut builder = HealthAggregator::builder(introspector()).timeout(Duration::from_millis(50));
        builder
            .register_fn("slow", |ctx: ProbeContext| async move {
                match ctx.run(tokio::time::sleep(Duration::from_secs(10))).await {
                    Some(()) => HealthStatus::healthy(),
                    None => HealthStatus::unhealthy("deadline exceeded"),
                }
            })
            .register_fn("after", |ctx: ProbeContext| async move {
                if ctx.is_expired() {
                    HealthStatus::unhealthy("no budget left")
                } else {
                    HealthStatus::healthy()
                }
            });

        let health = builder.build().check_health().await;
        assert_eq!(health.checks["slow"].message.as_deref(), Some("deadline exceeded"));
        assert_eq!(health.checks["after"].status, HealthState::Unhealthy);
    }

    #[tokio::test]
    async fn response_shape() {
        let aggregator = HealthAggregator::builder(introspector())
            .service("svc")
            .version("9.9.9")
            .build();
        let health = aggregator.check_health().await;
        let value = serde_json::to_value(&health).unwrap();

        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], "svc");
        assert_eq!(value["version"], "9.9.9");
        assert_eq!(value["system"]["active_workers"], 3);
        assert_eq!(value["system"]["memory_mb"], 12);
        assert_eq!(value["system"]["num_cpu"], 8);
        assert!(value["system"]["runtime_version"].is_string());
        assert!(DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
        assert!(value["uptime"].as_str().unwrap().ends_with('s'));
    }

    #[tokio::test]
    async fn defaults_register_config_and_system() {
        let aggregator =
            HealthAggregatorBuilder::with_defaults(Arc::new(AppConfig::default()), introspector())
                .build();
        assert_eq!(aggregator.check_names(), vec!["config", "system"]);
        assert_eq!(aggregator.timeout(), Duration::from_secs(5));

        let health = aggregator.check_health().await;
        assert_eq!(health.checks["config"].status, HealthState::Unhealthy);
        assert_eq!(health.checks["system"].status, HealthState::Healthy);
        assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_millis(250)), "250ms");
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_millis(3_500)), "3.5s");
        assert_eq!(format_uptime(Duration::from_secs(240)), "4m0s");
        assert_eq!(format_uptime(Duration::from_millis(3_723_500)), "1h2m3.5s");
    }

    #[test]
    fn overall_status_rule() {
        let healthy = HealthStatus::healthy();
        let warning = HealthStatus::warning("w");
        assert_eq!(overall_status([&healthy, &healthy]), OverallStatus::Healthy);
        assert_eq!(overall_status([&healthy, &warning]), OverallStatus::Unhealthy);
    }
}
