//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handlers, error responder, health aggregator:
//!     → logging.rs (severity-gated `[LEVEL] message k=v` lines)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Sinks:
//!     → tracing.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (external collector)
//! ```
//!
//! # Design Decisions
//! - The leveled logger is injected, never ambient
//! - Metrics are cheap facade calls; no exporter means no cost beyond a branch

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use logging::{Fields, LeveledLogger, LogFormat, LogLevel, LogSink, MemorySink, TracingSink};
