//! POST /generate_answer: answers a question from the indexed documents.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use contextor::AnswerResult;
use tracing::{debug, info};

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
    routes::{answer::generate_answer_request::GenerateAnswerRequest, fan_out},
};

/// Handler: POST /generate_answer
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/generate_answer \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the refund policy?","k":8}'
/// ```
pub async fn generate_answer_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<GenerateAnswerRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    debug!(request_id = %request_id, question = %body.question, k = ?body.k, "generate_answer: start");

    let k = fan_out(body.k)?;
    let result: AnswerResult = state.pipeline.answer(&body.question, k).await?;

    info!(
        request_id = %request_id,
        model_used = %result.model_used,
        context_found = result.context_found,
        chunks_used = result.chunks_used,
        "generate_answer: done"
    );

    Ok(ApiResponse::success(result).into_response_with_status(StatusCode::OK))
}
