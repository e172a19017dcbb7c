//! POST /add_website: fetch a page and ingest its text.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use rag_store::loaders::split_document;
use tracing::{debug, info};

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::AppResult,
    routes::ingest::{
        ingest_request::AddWebsiteRequest,
        ingest_response::{IngestResponse, IngestedDocument},
    },
};

pub async fn add_website_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(p): Json<AddWebsiteRequest>,
) -> AppResult<Response> {
    let request_id = request_id(&headers);
    debug!(request_id = %request_id, url = %p.url, "add_website: start");

    let doc = state.website.load(&p.url).await?;
    let chunks = split_document(&doc, &state.splitter);

    let added = state.pipeline.ingest_chunks(chunks).await?;
    let total = state.pipeline.stats().await?.total_chunks;

    info!(request_id = %request_id, url = %p.url, added, "add_website: done");

    let body = IngestResponse {
        message: "Website added".into(),
        documents: vec![IngestedDocument {
            name: p.url,
            chunks: added,
        }],
        chunks_added: added,
        total_chunks: total,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
