//! Middleware applied to every route.

pub mod cors;
pub mod metrics;
pub mod timeout;

pub use cors::{cors_middleware, CorsPolicy};
pub use metrics::metrics_middleware;
pub use timeout::{timeout_middleware, RequestTimeout};
