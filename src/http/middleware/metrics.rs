//! Request metrics middleware.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;

/// Keeps the in-flight gauge balanced even when the request future is
/// dropped by the timeout layer.
struct InFlightGuard;

impl InFlightGuard {
    fn enter() -> Self {
        metrics::increment_in_flight();
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        metrics::decrement_in_flight();
    }
}

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let _guard = InFlightGuard::enter();
    let response = next.run(request).await;

    metrics::record_request(&method, &path, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn passes_response_through() {
        let app = Router::new()
            .route("/api/todos", get(|| async { (StatusCode::CREATED, "ok") }))
            .layer(middleware::from_fn(metrics_middleware));

        let response = app
            .oneshot(Request::get("/api/todos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
