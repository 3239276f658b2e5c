//! HTTP surface: JSON read API plus the SSE push feed.

pub mod routes;
pub mod stream;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::errors::PumpwatchError;
use crate::logger::{log, LogTag};
use crate::monitor::TokenMonitor;

/// Shared handler state.
pub struct AppState {
    pub monitor: Arc<TokenMonitor>,
}

/// Build the router with CORS and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tokens", get(routes::list_tokens))
        .route("/tokens/:address", get(routes::get_token))
        .route("/stats", get(routes::get_stats))
        .route("/analyze", post(routes::analyze_token))
        .route("/stream", get(stream::stream_handler))
        .fallback(routes::not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves. A failed bind is fatal.
pub async fn start_server(
    state: Arc<AppState>,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), PumpwatchError> {
    let app = router(state);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PumpwatchError::Webserver(format!("failed to bind {}: {}", addr, e)))?;

    log(
        LogTag::Webserver,
        "LISTEN",
        &format!("Serving on http://{}", addr),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PumpwatchError::Webserver(format!("server error: {}", e)))
}
