//! Route handlers.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::errors::{AppError, ErrorCode};
use crate::http::request::CurrentRequestId;
use crate::http::response::render_json;
use crate::http::server::AppState;

/// `GET /health`: 200 when every probe is healthy, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let report = state.health.check_health().await;
    render_json(report.status_code(), &report)
}

/// Task item served by `/api/todos`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Todo {
    pub id: u32,
    pub title: &'static str,
    pub completed: bool,
}

pub const TODOS: [Todo; 2] = [
    Todo {
        id: 1,
        title: "チャーハン作るよ！",
        completed: true,
    },
    Todo {
        id: 2,
        title: "豚肉も入れるよ！",
        completed: false,
    },
];

/// `GET /api/todos`
pub async fn todos() -> impl IntoResponse {
    Json(TODOS)
}

/// Fallback for unmatched routes.
pub async fn not_found(
    State(state): State<AppState>,
    request_id: CurrentRequestId,
    uri: Uri,
) -> Response {
    state.responder.respond_with(request_id.as_deref(), AppError::business_rule(
        ErrorCode::ResourceNotFound,
        "Resource not found",
        Some(json!({ "path": uri.path() })),
    ))
}
