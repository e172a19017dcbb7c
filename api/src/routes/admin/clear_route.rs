//! POST /clear: drops every indexed chunk.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;
use tracing::info;

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
};

pub async fn clear_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    state.pipeline.reset().await?;
    info!(request_id = %request_id(&headers), "clear: store emptied");

    Ok(ApiResponse::success(json!({ "message": "Vector store cleared" }))
        .into_response_with_status(StatusCode::OK))
}
