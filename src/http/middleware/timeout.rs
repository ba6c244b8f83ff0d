//! Whole-request deadline.
//!
//! A request still running when the limit elapses is dropped and answered
//! through the error responder, so the client gets the usual JSON error body
//! and the failure is logged with its request ID.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, ErrorCode};
use crate::http::request::RequestIdExt;
use crate::http::response::ErrorResponder;

/// Deadline plus the responder that renders the timeout.
#[derive(Debug, Clone)]
pub struct RequestTimeout {
    pub limit: Duration,
    pub responder: ErrorResponder,
}

impl RequestTimeout {
    pub fn new(limit: Duration, responder: ErrorResponder) -> Self {
        Self { limit, responder }
    }
}

pub async fn timeout_middleware(
    State(timeout): State<RequestTimeout>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request.request_id().map(str::to_string);

    match tokio::time::timeout(timeout.limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => timeout.responder.respond_with(
            request_id.as_deref(),
            AppError::repository(
                ErrorCode::ServiceUnavailable,
                format!("Request timed out after {:?}", timeout.limit),
                None,
            ),
        ),
    }
}
