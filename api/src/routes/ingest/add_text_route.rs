//! POST /add_text: ingest raw text.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use rag_store::loaders::{load_text, split_document};
use tracing::info;

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
    routes::ingest::{
        ingest_request::AddTextRequest,
        ingest_response::{IngestResponse, IngestedDocument},
    },
};

pub async fn add_text_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(p): Json<AddTextRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);

    let doc = load_text(&p.text, p.title.as_deref())?;
    let chunks = split_document(&doc, &state.splitter);
    let name = doc
        .metadata
        .get("title")
        .map(ToString::to_string)
        .unwrap_or_default();

    let added = state.pipeline.ingest_chunks(chunks).await?;
    let total = state.pipeline.stats().await?.total_chunks;

    info!(request_id = %request_id, title = %name, added, "add_text: done");

    let body = IngestResponse {
        message: "Text added".into(),
        documents: vec![IngestedDocument { name, chunks: added }],
        chunks_added: added,
        total_chunks: total,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
