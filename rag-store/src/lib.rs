//! Chunk storage and ingestion building blocks.
//!
//! - [`ChunkStore`]: the store contract consumed by the answer pipeline, with
//!   [`InMemoryChunkStore`] as the shipped implementation.
//! - [`EmbeddingsProvider`]: real (LLM-service backed) or deterministic stub
//!   embeddings, chosen at startup via [`EmbeddingBackend`].
//! - [`TextSplitter`]: recursive character splitter with overlap.
//! - [`loaders`]: file/text/website loaders producing [`LoadedDocument`]s.

mod config;
mod embed;
mod errors;
pub mod loaders;
mod memory_store;
mod record;
mod splitter;
mod store;

pub use config::{EmbeddingConfig, SplitterConfig};
pub use embed::{
    DeterministicStubProvider, EmbeddingBackend, EmbeddingsProvider, RealEmbeddingProvider,
    build_provider,
};
pub use errors::{LoaderError, RagError};
pub use loaders::LoadedDocument;
pub use memory_store::InMemoryChunkStore;
pub use record::{Chunk, Metadata, MetadataValue, ScoredChunk};
pub use splitter::TextSplitter;
pub use store::{ChunkStore, StoreFuture};
