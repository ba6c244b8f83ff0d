use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::{AppError, ErrorCode, Failure};
use crate::health::format_uptime;
use crate::http::request::CurrentRequestId;
use crate::http::server::AppState;
use crate::observability::logging::{Fields, LogLevel};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogLevelBody {
    pub level: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime: format_uptime(state.started_at.elapsed()),
    })
}

pub async fn get_log_level(State(state): State<AppState>) -> Json<LogLevelBody> {
    Json(LogLevelBody {
        level: state.logger.level().as_str().to_string(),
    })
}

pub async fn put_log_level(
    State(state): State<AppState>,
    request_id: CurrentRequestId,
    body: Result<Json<LogLevelBody>, JsonRejection>,
) -> Response {
    let request_id = request_id.as_deref();
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return state
                .responder
                .respond_with(request_id, Failure::validation(rejection))
        }
    };

    let level: LogLevel = match body.level.parse() {
        Ok(level) => level,
        Err(_) => {
            return state.responder.respond_with(request_id, AppError::validation(
                ErrorCode::InvalidRequest,
                "Unknown log level",
                Some(json!({ "level": body.level, "valid": ["DEBUG", "INFO", "WARN", "ERROR"] })),
            ))
        }
    };

    let previous = state.logger.level();
    state.logger.set_level(level);
    // Logged at the new level so the gate never hides it.
    state.logger.log(
        level,
        "Log level changed",
        &Fields::new().with("from", previous).with("to", level),
    );

    Json(LogLevelBody {
        level: level.as_str().to_string(),
    })
    .into_response()
}
