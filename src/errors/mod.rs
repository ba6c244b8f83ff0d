//! Error taxonomy.
//!
//! # Data Flow
//! ```text
//! Failure raised in a handler or lower layer
//!     → tagged as Failure::{App, Validation, BusinessRule, Unclassified}
//!     → classify.rs (single total match)
//!     → AppError (code, message, details, fixed status, cause)
//!     → http::response::ErrorResponder (log + render)
//! ```
//!
//! # Status Mapping
//! | Constructor   | Status                                                 |
//! |---------------|--------------------------------------------------------|
//! | validation    | 400                                                    |
//! | repository    | 500; 401 unauthorized, 429 rate limit, 502 upstream API |
//! | business_rule | 400; 404 resource not found                            |
//! | internal      | 500                                                    |
//!
//! # Design Decisions
//! - Status codes come only from the constructors; `AppError` has no setter
//! - The wrapped cause is for logs; it is never part of the client body

pub mod app_error;
pub mod classify;

pub use app_error::{AppError, BoxError, ErrorBody, ErrorCode};
pub use classify::{classify, Failure, UNEXPECTED_ERROR_MESSAGE};
