//! Boundary classification of failures into `AppError`.
//!
//! Every failure crossing the response boundary carries an explicit taxonomy
//! tag chosen where it was raised. Classification is a single total match over
//! that tag; nothing is probed or unwrapped at runtime.

use std::error::Error as StdError;
use std::fmt;

use crate::errors::app_error::{AppError, BoxError, ErrorCode};

/// Client-safe message used for every unclassified failure.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// A failure tagged with its taxonomy at construction time.
pub enum Failure {
    /// Already classified; passes through unchanged.
    App(AppError),
    /// Malformed or missing input raised by a lower layer.
    Validation(BoxError),
    /// Domain constraint violation raised by a lower layer.
    BusinessRule(BoxError),
    /// Anything else. Its text never reaches the client.
    Unclassified(BoxError),
}

impl Failure {
    pub fn validation<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Failure::Validation(err.into())
    }

    pub fn business_rule<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Failure::BusinessRule(err.into())
    }

    pub fn unclassified<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Failure::Unclassified(err.into())
    }
}

impl From<AppError> for Failure {
    fn from(err: AppError) -> Self {
        Failure::App(err)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::App(e) => f.debug_tuple("App").field(e).finish(),
            Failure::Validation(e) => f.debug_tuple("Validation").field(e).finish(),
            Failure::BusinessRule(e) => f.debug_tuple("BusinessRule").field(e).finish(),
            Failure::Unclassified(e) => f.debug_tuple("Unclassified").field(e).finish(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::App(e) => write!(f, "{}", e),
            Failure::Validation(e) | Failure::BusinessRule(e) | Failure::Unclassified(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Failure::App(e) => e.source(),
            Failure::Validation(e) | Failure::BusinessRule(e) | Failure::Unclassified(e) => {
                Some(e.as_ref())
            }
        }
    }
}

/// Turn any tagged failure into an `AppError`.
pub fn classify(failure: impl Into<Failure>) -> AppError {
    match failure.into() {
        Failure::App(err) => err,
        Failure::Validation(err) => {
            AppError::validation(ErrorCode::InvalidRequest, err.to_string(), None)
        }
        Failure::BusinessRule(err) => {
            AppError::business_rule(ErrorCode::BusinessRuleViolation, err.to_string(), None)
        }
        Failure::Unclassified(err) => AppError::internal(UNEXPECTED_ERROR_MESSAGE, Some(err)),
    }
}
