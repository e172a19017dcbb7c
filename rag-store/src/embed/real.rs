use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use tracing::warn;

use crate::{embed::EmbeddingsProvider, errors::RagError, store::StoreFuture};

/// Embeddings from the LLM service `embedding` profile (OpenAI or Ollama).
#[derive(Clone)]
pub struct RealEmbeddingProvider {
    svc: Arc<LlmServiceProfiles>,
    name: String,
}

impl RealEmbeddingProvider {
    /// # Errors
    /// `RagError::Config` if the service has no embedding profile.
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Result<Self, RagError> {
        let name = svc
            .embedding_profile()
            .map(|p| p.tag())
            .ok_or_else(|| RagError::Config("embedding profile is not configured".into()))?;
        Ok(Self { svc, name })
    }
}

impl EmbeddingsProvider for RealEmbeddingProvider {
    fn embed<'a>(&'a self, text: &'a str) -> StoreFuture<'a, Vec<f32>> {
        Box::pin(async move {
            self.svc.embed(text).await.map_err(|e| {
                warn!(error = %e, "embedding request failed");
                RagError::Embedding(e.to_string())
            })
        })
    }

    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> StoreFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            self.svc.embed_batch(texts).await.map_err(|e| {
                warn!(error = %e, batch = texts.len(), "batch embedding request failed");
                RagError::Embedding(e.to_string())
            })
        })
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        &self.name
    }
}
