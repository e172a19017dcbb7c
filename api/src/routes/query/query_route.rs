//! POST /query: raw similarity search, no relevance filtering.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::debug;

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
    routes::{
        fan_out,
        query::{
            query_request::QueryRequest,
            query_response::{QueryHit, QueryResponse},
        },
    },
};

pub async fn query_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(p): Json<QueryRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    debug!(request_id = %request_id, question = %p.question, "query_route: start");

    let hits = state.pipeline.search(&p.question, fan_out(p.k)?).await?;

    debug!(request_id = %request_id, hits = hits.len(), "query_route: success");

    let body = QueryResponse {
        question: p.question,
        results: hits.into_iter().map(QueryHit::from).collect(),
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
