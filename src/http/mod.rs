//! HTTP glue subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (add or keep request ID)
//!     → middleware/ (metrics, timeout, CORS preflight)
//!     → handlers.rs (health, todos, not-found fallback)
//!     → response.rs (classify failures, log, render JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CurrentRequestId, RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::{render_json, severity_for, ErrorResponder};
pub use server::{AppState, HttpServer, ServerError};
