//! Error response rendering.
//!
//! # Responsibilities
//! - Classify failures surfaced by handlers
//! - Log each one at a severity derived from its status code
//! - Render `{code, message, details?}` JSON with the classified status
//!
//! # Design Decisions
//! - Severity: >= 500 error, 400-499 warn, anything else info
//! - The cause text goes to the log line only, never to the body
//! - If the body cannot be encoded the client gets a fixed plain-text 500;
//!   the fallback path never touches the JSON encoder

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::errors::{classify, AppError, Failure};
use crate::observability::logging::{
    Fields, LeveledLogger, LogLevel, CAUSE_FIELD, REQUEST_ID_FIELD,
};
use crate::observability::metrics;

/// Body of the plain-text fallback response.
pub const ENCODE_FAILURE_BODY: &str = "Internal server error";

/// Turns failures into logged, client-safe HTTP responses.
#[derive(Debug, Clone)]
pub struct ErrorResponder {
    logger: Arc<LeveledLogger>,
}

impl ErrorResponder {
    pub fn new(logger: Arc<LeveledLogger>) -> Self {
        Self { logger }
    }

    /// Classify, log and render a failure.
    pub fn respond(&self, failure: impl Into<Failure>) -> Response {
        self.respond_with(None, failure)
    }

    /// Like `respond`, tagging the log line with the request's correlation ID.
    pub fn respond_with(&self, request_id: Option<&str>, failure: impl Into<Failure>) -> Response {
        let err = classify(failure);
        self.log_error(&err, request_id);
        metrics::record_error_response(err.code().as_str());
        render_json(err.status_code(), &err.body())
    }

    fn log_error(&self, err: &AppError, request_id: Option<&str>) {
        let mut fields = Fields::new()
            .with("code", err.code())
            .with("message", err.message())
            .with("statusCode", err.status_code().as_u16());
        if let Some(details) = err.details() {
            fields.push("details", details);
        }
        if let Some(cause) = err.cause() {
            fields.push(CAUSE_FIELD, cause);
        }
        if let Some(id) = request_id {
            fields.push(REQUEST_ID_FIELD, id);
        }

        let level = severity_for(err.status_code());
        let message = match level {
            LogLevel::Error => "Server error occurred",
            LogLevel::Warn => "Client error occurred",
            _ => "Error handled",
        };
        self.logger.log(level, message, &fields);
    }
}

/// Log severity for an error response status.
pub fn severity_for(status: StatusCode) -> LogLevel {
    match status.as_u16() {
        500.. => LogLevel::Error,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Info,
    }
}

/// Serialize `body` as JSON under `status`, or fall back to plain text.
pub fn render_json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode error response");
            encode_failure()
        }
    }
}

fn encode_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ENCODE_FAILURE_BODY,
    )
        .into_response()
}
