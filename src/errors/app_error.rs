//! Classified failure record and its constructors.

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Boxed error carried as the wrapped cause of an `AppError`.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Stable error symbols exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    InvalidRequest,
    MissingParameter,
    InvalidDateRange,
    InvalidDeveloper,

    // Repository
    DatabaseError,
    ExternalApiError,
    RateLimitExceeded,
    Unauthorized,

    // Business rules
    BusinessRuleViolation,
    ResourceNotFound,

    // System
    InternalError,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::MissingParameter => "MISSING_PARAMETER",
            ErrorCode::InvalidDateRange => "INVALID_DATE_RANGE",
            ErrorCode::InvalidDeveloper => "INVALID_DEVELOPER",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ExternalApiError => "EXTERNAL_API_ERROR",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::BusinessRuleViolation => "BUSINESS_RULE_VIOLATION",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure ready to be logged and rendered.
///
/// The status code is fixed by the constructor that built the error and
/// cannot be changed afterwards. The cause is available to logs only.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    status: StatusCode,
    #[source]
    cause: Option<BoxError>,
}

impl AppError {
    /// Malformed or missing input. Always 400.
    pub fn validation(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            status: StatusCode::BAD_REQUEST,
            cause: None,
        }
    }

    /// Upstream or storage failure. 500 unless the code names a more specific status.
    pub fn repository(
        code: ErrorCode,
        message: impl Into<String>,
        cause: Option<BoxError>,
    ) -> Self {
        let status = match code {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ExternalApiError => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            code,
            message: message.into(),
            details: None,
            status,
            cause,
        }
    }

    /// Domain constraint violation. 400, or 404 for `ResourceNotFound`.
    pub fn business_rule(
        code: ErrorCode,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        let status = if code == ErrorCode::ResourceNotFound {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            code,
            message: message.into(),
            details,
            status,
            cause: None,
        }
    }

    /// Unexpected failure. Always 500 with code `INTERNAL_ERROR`.
    pub fn internal(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: message.into(),
            details: None,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            cause,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Client-visible projection: code, message and details only.
    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            code: self.code,
            message: &self.message,
            details: self.details.as_ref(),
        }
    }
}

/// Serialized error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: ErrorCode,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn io_cause(msg: &str) -> Option<BoxError> {
        Some(Box::new(std::io::Error::new(std::io::ErrorKind::Other, msg.to_string())))
    }

    #[test]
    fn validation_is_always_400() {
        for code in [ErrorCode::InvalidRequest, ErrorCode::MissingParameter, ErrorCode::ResourceNotFound] {
            let err = AppError::validation(code, "bad", None);
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn repository_status_table() {
        let cases = [
            (ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED),
            (ErrorCode::RateLimitExceeded, StatusCode::TOO_MANY_REQUESTS),
            (ErrorCode::ExternalApiError, StatusCode::BAD_GATEWAY),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, expected) in cases {
            let err = AppError::repository(code, "upstream", io_cause("conn reset"));
            assert_eq!(err.status_code(), expected, "code {code}");
        }
    }

    #[test]
    fn business_rule_status_table() {
        let not_found = AppError::business_rule(ErrorCode::ResourceNotFound, "missing", None);
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let violation = AppError::business_rule(ErrorCode::BusinessRuleViolation, "nope", None);
        assert_eq!(violation.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_wraps_cause() {
        let err = AppError::internal("oops", io_cause("disk on fire"));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.cause().unwrap().to_string(), "disk on fire");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn display_uses_code_and_message() {
        let err = AppError::validation(ErrorCode::MissingParameter, "developer is required", None);
        assert_eq!(err.to_string(), "MISSING_PARAMETER: developer is required");
    }

    #[test]
    fn body_omits_cause_and_absent_details() {
        let err = AppError::repository(ErrorCode::DatabaseError, "query failed", io_cause("password=hunter2"));
        let rendered = serde_json::to_value(err.body()).unwrap();
        assert_eq!(rendered, json!({"code": "DATABASE_ERROR", "message": "query failed"}));

        let err = AppError::validation(
            ErrorCode::InvalidDateRange,
            "start after end",
            Some(json!({"start": "2024-02-01"})),
        );
        let rendered = serde_json::to_value(err.body()).unwrap();
        assert_eq!(rendered["details"]["start"], "2024-02-01");
    }
}
