//! Storage seam between the answer pipeline and a vector index.

use std::{future::Future, pin::Pin};

use crate::{
    errors::RagError,
    record::{Chunk, ScoredChunk},
};

/// Boxed future returned by store and embedding operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Shared, mutable chunk index consumed by the answer pipeline.
///
/// Implementations must make `add_chunks` atomic for readers (a batch is
/// either fully visible or not at all) and `clear` immediately visible.
pub trait ChunkStore: Send + Sync {
    /// Stores the batch and returns how many chunks were added.
    fn add_chunks<'a>(&'a self, chunks: Vec<Chunk>) -> StoreFuture<'a, usize>;

    /// Up to `k` chunks ordered by descending score. An empty store yields
    /// an empty vector.
    fn similarity_search<'a>(&'a self, query: &'a str, k: usize)
    -> StoreFuture<'a, Vec<ScoredChunk>>;

    /// Removes every chunk.
    fn clear<'a>(&'a self) -> StoreFuture<'a, ()>;

    /// Number of stored chunks.
    fn size<'a>(&'a self) -> StoreFuture<'a, usize>;
}
