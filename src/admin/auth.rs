use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, ErrorCode};
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;

/// Reject admin requests that do not carry `Authorization: Bearer <api_key>`.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let expected = state.config.admin.api_key.as_str();
    if !expected.is_empty() && presented == Some(expected) {
        return next.run(request).await;
    }

    state.responder.respond_with(request.request_id(), AppError::repository(
        ErrorCode::Unauthorized,
        "Invalid or missing admin credentials",
        None,
    ))
}
