//! In-memory chunk index with brute-force cosine similarity.

use std::{cmp::Ordering, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, info, trace};

use crate::{
    embed::EmbeddingsProvider,
    errors::RagError,
    record::{Chunk, ScoredChunk},
    store::{ChunkStore, StoreFuture},
};

struct Entry {
    chunk: Chunk,
    /// L2-normalized embedding.
    vector: Vec<f32>,
}

enum State {
    Ready {
        entries: Vec<Entry>,
        dim: Option<usize>,
    },
    Closed,
}

/// [`ChunkStore`] holding every chunk and its embedding in memory.
///
/// Scores are `(cosine + 1) / 2`, clamped to `[0, 1]`, so `1 - score` is a
/// valid distance. Batches are embedded before the write lock is taken and
/// appended in one step, so readers never see half a batch.
pub struct InMemoryChunkStore {
    embedder: Arc<dyn EmbeddingsProvider>,
    state: RwLock<State>,
}

impl InMemoryChunkStore {
    pub fn new(embedder: Arc<dyn EmbeddingsProvider>) -> Self {
        info!(embedder = embedder.name(), "in-memory chunk store initialized");
        Self {
            embedder,
            state: RwLock::new(State::Ready {
                entries: Vec::new(),
                dim: None,
            }),
        }
    }

    /// Name of the embedding provider backing this store.
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Tears the store down; later calls fail with [`RagError::Unavailable`].
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        *state = State::Closed;
        info!("in-memory chunk store shut down");
    }

    async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, RagError> {
        if chunks.is_empty() {
            return Ok(0);
        }
        self.ensure_open().await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::Unavailable(e.to_string()))?;

        if vectors.len() != chunks.len() {
            return Err(RagError::Unavailable(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        // A provider with a declared size must honor it; otherwise the batch sets the size.
        let batch_dim = self
            .embedder
            .dimension()
            .or_else(|| vectors.first().map(Vec::len))
            .unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != batch_dim) {
            return Err(RagError::VectorSizeMismatch {
                got: bad.len(),
                want: batch_dim,
            });
        }

        let mut guard = self.state.write().await;
        let State::Ready { entries, dim } = &mut *guard else {
            return Err(RagError::Unavailable("store is shut down".into()));
        };

        match *dim {
            Some(want) if want != batch_dim => {
                return Err(RagError::VectorSizeMismatch {
                    got: batch_dim,
                    want,
                });
            }
            _ => *dim = Some(batch_dim),
        }

        let added = chunks.len();
        entries.extend(chunks.into_iter().zip(vectors).map(|(chunk, mut vector)| {
            normalize(&mut vector);
            Entry { chunk, vector }
        }));

        debug!(added, total = entries.len(), "chunks added");
        Ok(added)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RagError> {
        if k == 0 || self.len().await? == 0 {
            return Ok(Vec::new());
        }

        let mut qv = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagError::Unavailable(e.to_string()))?;
        normalize(&mut qv);

        let guard = self.state.read().await;
        let State::Ready { entries, dim } = &*guard else {
            return Err(RagError::Unavailable("store is shut down".into()));
        };
        if let Some(want) = *dim {
            if want != qv.len() && !entries.is_empty() {
                return Err(RagError::VectorSizeMismatch {
                    got: qv.len(),
                    want,
                });
            }
        }

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|e| (similarity(&qv, &e.vector), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let out: Vec<ScoredChunk> = scored
            .into_iter()
            .take(k)
            .map(|(score, e)| ScoredChunk {
                chunk: e.chunk.clone(),
                score,
            })
            .collect();

        trace!(k, hits = out.len(), "similarity search done");
        Ok(out)
    }

    async fn len(&self) -> Result<usize, RagError> {
        match &*self.state.read().await {
            State::Ready { entries, .. } => Ok(entries.len()),
            State::Closed => Err(RagError::Unavailable("store is shut down".into())),
        }
    }

    async fn ensure_open(&self) -> Result<(), RagError> {
        self.len().await.map(|_| ())
    }

    async fn reset(&self) -> Result<(), RagError> {
        let mut guard = self.state.write().await;
        match &mut *guard {
            State::Ready { entries, dim } => {
                let removed = entries.len();
                entries.clear();
                *dim = None;
                info!(removed, "chunk store cleared");
                Ok(())
            }
            State::Closed => Err(RagError::Unavailable("store is shut down".into())),
        }
    }
}

impl ChunkStore for InMemoryChunkStore {
    fn add_chunks<'a>(&'a self, chunks: Vec<Chunk>) -> StoreFuture<'a, usize> {
        Box::pin(self.add(chunks))
    }

    fn similarity_search<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> StoreFuture<'a, Vec<ScoredChunk>> {
        Box::pin(self.search(query, k))
    }

    fn clear<'a>(&'a self) -> StoreFuture<'a, ()> {
        Box::pin(self.reset())
    }

    fn size<'a>(&'a self) -> StoreFuture<'a, usize> {
        Box::pin(self.len())
    }
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine of two normalized vectors mapped to `[0, 1]`.
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let cos: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::DeterministicStubProvider;

    fn store() -> InMemoryChunkStore {
        InMemoryChunkStore::new(Arc::new(DeterministicStubProvider::new(256).unwrap()))
    }

    fn chunk(text: &str) -> Chunk {
        Chunk::new(text, "doc").unwrap()
    }

    #[tokio::test]
    async fn empty_store_search_is_empty() {
        let s = store();
        assert!(s.similarity_search("anything", 5).await.unwrap().is_empty());
        assert_eq!(s.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn results_are_ranked_and_bounded() {
        let s = store();
        let added = s
            .add_chunks(vec![
                chunk("shipping takes five business days"),
                chunk("our refund policy allows returns"),
                chunk("refund requests need a receipt"),
            ])
            .await
            .unwrap();
        assert_eq!(added, 3);

        let hits = s.similarity_search("refund policy", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].chunk.text(), "our refund policy allows returns");
        assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.score)));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let s = store();
        s.add_chunks(vec![chunk("some text")]).await.unwrap();
        s.clear().await.unwrap();
        assert_eq!(s.size().await.unwrap(), 0);
        s.clear().await.unwrap();
        assert_eq!(s.size().await.unwrap(), 0);
        assert!(s.similarity_search("some text", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shut_down_store_is_unavailable() {
        let s = store();
        s.shutdown().await;
        assert!(matches!(
            s.add_chunks(vec![chunk("x")]).await,
            Err(RagError::Unavailable(_))
        ));
        assert!(matches!(
            s.similarity_search("x", 1).await,
            Err(RagError::Unavailable(_))
        ));
    }

    /// Declares 4 dimensions but returns 3.
    struct ShortVectors;

    impl EmbeddingsProvider for ShortVectors {
        fn embed<'a>(&'a self, _text: &'a str) -> StoreFuture<'a, Vec<f32>> {
            Box::pin(async { Ok(vec![1.0, 0.0, 0.0]) })
        }

        fn dimension(&self) -> Option<usize> {
            Some(4)
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    #[tokio::test]
    async fn vectors_must_match_declared_dimension() {
        let s = InMemoryChunkStore::new(Arc::new(ShortVectors));
        assert!(matches!(
            s.add_chunks(vec![chunk("some text")]).await,
            Err(RagError::VectorSizeMismatch { got: 3, want: 4 })
        ));
        assert_eq!(s.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_batches_are_all_visible() {
        let s = Arc::new(store());
        let mut handles = Vec::new();
        for i in 0..8 {
            let s = s.clone();
            handles.push(tokio::spawn(async move {
                let batch = (0..5).map(|j| chunk(&format!("batch {i} item {j}"))).collect();
                s.add_chunks(batch).await.unwrap()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), 5);
        }
        assert_eq!(s.size().await.unwrap(), 40);
    }
}
