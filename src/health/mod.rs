//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     HealthAggregatorBuilder
//!     → register_check / register_fn (config, system, custom probes)
//!     → build() → Arc<HealthAggregator> (immutable)
//!
//! GET /health:
//!     ProbeContext (shared deadline, default 5s)
//!     → each probe in registration order (check.rs)
//!     → merge into OverallHealthResponse (aggregator.rs)
//!     → 200 healthy / 503 otherwise
//! ```
//!
//! # Design Decisions
//! - Probes are independent; one probe's result never affects another's
//! - Resource counters come from an injected introspector (system.rs)
//! - Per-probe statuses are reported verbatim even when the overall status
//!   is demoted

pub mod aggregator;
pub mod check;
pub mod probes;
pub mod system;

pub use aggregator::{
    format_uptime, overall_status, HealthAggregator, HealthAggregatorBuilder,
    OverallHealthResponse, OverallStatus, SystemInfo, DEFAULT_PROBE_TIMEOUT,
};
pub use check::{FnCheck, HealthCheck, HealthState, HealthStatus, ProbeContext};
pub use probes::{assess_system, ConfigHealthCheck, SystemHealthCheck};
pub use system::{FixedIntrospector, RuntimeIntrospector, SystemIntrospector, SystemSnapshot};
