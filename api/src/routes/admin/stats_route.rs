//! GET /stats: store size and active backends.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_chunks: usize,
    pub embedding_backend: String,
    /// `None` means answers are produced by the fallback path only.
    pub model: Option<String>,
    pub chunk_size: usize,
}

pub async fn stats_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let stats = state.pipeline.stats().await?;
    let body = StatsResponse {
        total_chunks: stats.total_chunks,
        embedding_backend: state.store.embedder_name().to_string(),
        model: stats.model,
        chunk_size: state.splitter.chunk_size(),
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
