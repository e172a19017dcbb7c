//! HTTP surface of the document Q&A backend.
//!
//! [`router`] wires the routes onto an explicit [`AppState`]; [`start`] builds
//! the state from the environment and serves until Ctrl+C.

use std::sync::Arc;

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

pub use crate::core::app_state::{AppSettings, AppState, ConfigError, ServerConfig};
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        admin::{clear_route::clear_route, health_route::health_route, stats_route::stats_route},
        answer::generate_answer_route::generate_answer_route,
        ingest::{
            add_text_route::add_text_route, add_website_route::add_website_route,
            upload_route::upload_route,
        },
        query::query_route::query_route,
    },
};

/// Builds the application router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.server.max_upload_bytes;

    Router::new()
        .route("/generate_answer", post(generate_answer_route))
        .route("/query", post(query_route))
        .route("/upload", post(upload_route))
        .route("/add_text", post(add_text_route))
        .route("/add_website", post(add_website_route))
        .route("/clear", post(clear_route))
        .route("/stats", get(stats_route))
        .route("/health", get(health_route))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves `state` on `listener` until `shutdown` resolves, then closes the store.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::Server)?;

    state.shutdown().await;
    info!("server stopped");
    Ok(())
}

/// Builds state from the environment, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let state = Arc::new(AppState::from_env()?);

    let listener = TcpListener::bind(&state.server.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %state.server.address, "listening");

    serve(listener, state, shutdown_signal()).await
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
