//! GET /health: liveness plus LLM provider probes.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// One entry per configured provider profile; empty when none is configured.
    pub providers: Vec<HealthStatus>,
}

/// Always `200`: provider failures are reported in the body, not the status.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let providers = state.llm.health_all().await;
    let status = if providers.iter().all(|p| p.ok) {
        "ok"
    } else {
        "degraded"
    };
    ApiResponse::success(HealthResponse { status, providers })
        .into_response_with_status(StatusCode::OK)
}
