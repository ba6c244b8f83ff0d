//! Allow-list CORS middleware.
//!
//! Echoes the request `Origin` back only when it exactly matches a configured
//! origin. Method, header and max-age headers are always set. Preflight
//! (`OPTIONS`) requests are answered here with 200 and never reach a handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityConfig;

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const MAX_AGE_SECS: &str = "86400";

/// Origins permitted to read responses cross-site.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Arc<[String]>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins: allowed_origins.into(),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.allowed_origins.clone())
    }

    /// Exact, case-sensitive match against the allow-list.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .filter(|value| value.to_str().is_ok_and(|o| policy.is_allowed(o)))
        .cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    if let Some(origin) = origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );

    response
}
