//! POST /upload: multipart file ingestion.
//!
//! Every file part is loaded and split before anything is stored, so a bad
//! file rejects the whole upload.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use rag_store::loaders::{load_file, split_document};
use tracing::{debug, info};

use crate::{
    core::{
        app_state::AppState,
        http::{request_id::request_id, response_envelope::ApiResponse},
    },
    error_handler::{AppError, AppResult},
    routes::ingest::ingest_response::{IngestResponse, IngestedDocument},
};

pub async fn upload_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let request_id = request_id(&headers);

    let mut documents = Vec::new();
    let mut chunks = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!(request_id = %request_id, field = ?field.name(), "skipping non-file part");
            continue;
        };
        let bytes = field.bytes().await?;
        debug!(request_id = %request_id, %filename, bytes = bytes.len(), "upload: file received");

        let doc = load_file(&filename, &bytes)?;
        let doc_chunks = split_document(&doc, &state.splitter);
        documents.push(IngestedDocument {
            name: filename,
            chunks: doc_chunks.len(),
        });
        chunks.extend(doc_chunks);
    }

    if documents.is_empty() {
        return Err(AppError::BadRequest("no files in upload".into()));
    }

    let added = state.pipeline.ingest_chunks(chunks).await?;
    let total = state.pipeline.stats().await?.total_chunks;

    info!(request_id = %request_id, files = documents.len(), added, "upload: done");

    let body = IngestResponse {
        message: format!("Processed {} file(s)", documents.len()),
        documents,
        chunks_added: added,
        total_chunks: total,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
