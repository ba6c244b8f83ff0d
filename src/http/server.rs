//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (timeout, tracing, request ID, CORS, metrics)
//! - Route unmatched paths through the error responder
//! - Bind server to listener and drain on shutdown

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{middleware, routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::config::AppConfig;
use crate::health::HealthAggregator;
use crate::http::handlers;
use crate::http::middleware::{
    cors_middleware, metrics_middleware, timeout_middleware, CorsPolicy, RequestTimeout,
};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ErrorResponder;
use crate::lifecycle::Shutdown;
use crate::observability::logging::LeveledLogger;

/// Errors raised while serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub logger: Arc<LeveledLogger>,
    pub responder: ErrorResponder,
    pub health: Arc<HealthAggregator>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        logger: Arc<LeveledLogger>,
        health: HealthAggregator,
    ) -> Self {
        Self {
            responder: ErrorResponder::new(logger.clone()),
            config,
            logger,
            health: Arc::new(health),
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the metrics API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self {
            router: Self::build_router(state),
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let config = state.config.clone();
        let policy = CorsPolicy::from_config(&config.security);
        let timeout = RequestTimeout::new(
            Duration::from_secs(config.server.request_timeout_secs),
            state.responder.clone(),
        );

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/todos", get(handlers::todos));

        if config.admin.enabled {
            router = router.merge(admin::router(state.clone()));
        }

        router
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(policy, cors_middleware))
            .layer(middleware::from_fn_with_state(timeout, timeout_middleware))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = &self.config.server.bind_address;
        TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })
    }

    /// Serve until `shutdown` fires, then give in-flight requests the
    /// configured grace period to finish.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut stop = shutdown.subscribe();
        let mut drain = shutdown.subscribe();
        let grace = Duration::from_secs(self.config.server.shutdown_timeout_secs);

        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                result?;
                tracing::info!("HTTP server stopped");
                return Ok(());
            }
            _ = drain.recv() => {
                tracing::info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
            }
        }

        match tokio::time::timeout(grace, server).await {
            Ok(result) => result?,
            Err(_) => tracing::warn!(
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed, dropping remaining connections"
            ),
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
