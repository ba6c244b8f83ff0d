//! Metrics registration and exposition.
//!
//! # Responsibilities
//! - Define service metrics (request counts, latency, in-flight, health, errors)
//! - Install a Prometheus-compatible scrape endpoint for the external collector
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, endpoint, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_requests_in_flight` (gauge): requests currently being served
//! - `health_check_status` (gauge): 1=healthy, 0.5=warning, 0=unhealthy
//! - `error_responses_total` (counter): rendered error responses by code
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Endpoint labels are normalized to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::HealthState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Collapse a request path into a bounded label.
pub fn normalize_endpoint(path: &str) -> String {
    if path == "/metrics" || path == "/health" {
        return path.to_string();
    }

    if let Some(rest) = path.strip_prefix("/api/") {
        return match rest.split('/').next() {
            Some(segment) if !segment.is_empty() => format!("/api/{}", segment),
            _ => "/api/*".to_string(),
        };
    }

    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    "/other".to_string()
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let endpoint = normalize_endpoint(path);
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn increment_in_flight() {
    gauge!("http_requests_in_flight").increment(1.0);
}

pub fn decrement_in_flight() {
    gauge!("http_requests_in_flight").decrement(1.0);
}

pub fn record_health_check(check: &str, state: HealthState) {
    let value = match state {
        HealthState::Healthy => 1.0,
        HealthState::Warning => 0.5,
        HealthState::Unhealthy => 0.0,
    };
    gauge!("health_check_status", "check" => check.to_string()).set(value);
}

pub fn record_error_response(code: &str) {
    counter!("error_responses_total", "code" => code.to_string()).increment(1);
}
