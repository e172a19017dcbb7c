//! Store-side configuration: embedding backend selection and chunking.
//!
//! Environment variables:
//! - `EMBEDDING_BACKEND`  = `real` | `stub` (default: real iff an embedding profile exists)
//! - `STUB_EMBEDDING_DIM` = stub vector size (default 384)
//! - `CHUNK_SIZE`         = max chars per chunk (default 1500)
//! - `CHUNK_OVERLAP`      = chars carried between chunks (default 300)

use std::str::FromStr;

use ai_llm_service::config::default_config::Lookup;

use crate::{embed::EmbeddingBackend, errors::RagError};

pub const DEFAULT_STUB_DIM: usize = 384;
pub const DEFAULT_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 300;

/// How chunk and query vectors are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Explicit backend; `None` lets [`crate::build_provider`] decide.
    pub backend: Option<EmbeddingBackend>,
    pub stub_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: None,
            stub_dim: DEFAULT_STUB_DIM,
        }
    }
}

impl EmbeddingConfig {
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, RagError> {
        let backend = vars("EMBEDDING_BACKEND")
            .map(|v| EmbeddingBackend::from_str(&v))
            .transpose()?;
        let stub_dim = parse(vars, "STUB_EMBEDDING_DIM", DEFAULT_STUB_DIM)?;
        if stub_dim == 0 {
            return Err(RagError::Config("STUB_EMBEDDING_DIM must be > 0".into()));
        }
        Ok(Self { backend, stub_dim })
    }
}

/// Chunking parameters for [`crate::TextSplitter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl SplitterConfig {
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, RagError> {
        let cfg = Self {
            chunk_size: parse(vars, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: parse(vars, "CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// `chunk_size` must be positive and strictly larger than `chunk_overlap`.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn parse(vars: Lookup<'_>, name: &str, default: usize) -> Result<usize, RagError> {
    match vars(name) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| RagError::Config(format!("{name}: expected a non-negative integer"))),
        None => Ok(default),
    }
}
