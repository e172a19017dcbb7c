use serde::Serialize;

/// One ingested document.
#[derive(Debug, Serialize)]
pub struct IngestedDocument {
    /// Filename, title or URL, depending on the source.
    pub name: String,
    pub chunks: usize,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub documents: Vec<IngestedDocument>,
    pub chunks_added: usize,
    /// Store size after ingestion.
    pub total_chunks: usize,
}
