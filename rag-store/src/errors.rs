//! Unified error types for the crate.

use thiserror::Error;

/// Error for chunk-store and embedding operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The store is shut down or its backing call failed.
    #[error("chunk store unavailable: {0}")]
    Unavailable(String),

    /// Embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// A chunk was built with blank text.
    #[error("chunk text must not be empty")]
    EmptyChunk,

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Error raised while turning raw inputs (files, text, URLs) into documents.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("no text could be extracted from {0}")]
    Empty(String),

    #[error("http client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("{url} is larger than {limit} bytes")]
    TooLarge { url: String, limit: usize },
}
