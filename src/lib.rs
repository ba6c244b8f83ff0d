//! Observability core for the GitHub statistics API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ──▶ handlers ──▶ health::HealthAggregator
//!                          │                │               │
//!                          │                ▼               ▼
//!                          │        errors::classify   probes (config, system)
//!                          │                │
//!                          ▼                ▼
//!                     middleware    http::ErrorResponder ──▶ observability::LeveledLogger
//!                   (CORS, metrics)                                   │
//!                                                                     ▼
//!                                                              tracing subscriber
//! ```
//!
//! Cross-cutting: `config` (TOML or environment), `lifecycle` (startup,
//! signals, graceful shutdown), `admin` (runtime log level).

pub mod admin;
pub mod config;
pub mod errors;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use errors::{classify, AppError, ErrorCode, Failure};
pub use health::{HealthAggregator, HealthAggregatorBuilder};
pub use http::{ErrorResponder, HttpServer};
pub use lifecycle::Shutdown;
pub use observability::LeveledLogger;
