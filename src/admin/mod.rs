//! Runtime administration endpoints.
//!
//! Mounted only when `admin.enabled` is set. Every route sits behind bearer
//! authentication against `admin.api_key`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::{get_log_level, get_status, put_log_level};
use crate::http::server::AppState;

/// Admin routes, left stateless so they merge into the main router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/log-level", get(get_log_level).put(put_log_level))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
