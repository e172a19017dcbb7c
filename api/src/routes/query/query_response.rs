use rag_store::{Metadata, ScoredChunk};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub results: Vec<QueryHit>,
}

/// Raw retrieval hit; `distance = 1 - score`.
#[derive(Debug, Serialize)]
pub struct QueryHit {
    pub text: String,
    pub metadata: Metadata,
    pub score: f32,
    pub distance: f32,
}

impl From<ScoredChunk> for QueryHit {
    fn from(hit: ScoredChunk) -> Self {
        Self {
            text: hit.chunk.text().to_string(),
            metadata: hit.chunk.metadata().clone(),
            score: hit.score,
            distance: 1.0 - hit.score,
        }
    }
}
