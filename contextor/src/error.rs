//! Typed error for the contextor crate.

use thiserror::Error;

use crate::llm::ModelError;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Blank question or non-positive fan-out.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bad pipeline setting at startup.
    #[error("invalid pipeline config: {0}")]
    Config(String),

    /// Ingestion called with no chunks.
    #[error("no chunks supplied")]
    EmptyInput,

    /// The chunk store failed; fatal for the request.
    #[error("chunk store unavailable: {0}")]
    StoreUnavailable(#[from] rag_store::RagError),

    /// Model failure that could not be absorbed by the fallback path.
    #[error("language model failed: {0}")]
    Model(#[from] ModelError),
}
