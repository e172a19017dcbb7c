//! Retrieval-and-answer pipeline.
//!
//! `answer` retrieves top-k hits, applies the [`RelevanceFilter`], prompts the
//! model once and, when the model fails, times out or is not configured,
//! degrades to excerpts from a narrower retrieval. The pipeline holds no
//! per-request state; the store is the only shared mutable resource.

use std::sync::Arc;

use rag_store::{Chunk, ChunkStore, ScoredChunk};
use tracing::{debug, info, instrument, warn};

use crate::{
    api_types::{
        AnswerResult, MODEL_FALLBACK, MODEL_FALLBACK_ENHANCED, MODEL_NONE, PipelineStats,
        SourceRef,
    },
    cfg::PipelineConfig,
    error::ContextorError,
    filter::RelevanceFilter,
    llm::{LanguageModel, ModelError},
    prompt::{CONTEXT_SEPARATOR, NO_RELEVANT_INFO, build_prompt, first_chars, preview},
};

pub struct RetrievalAnswerPipeline {
    store: Arc<dyn ChunkStore>,
    model: Option<Arc<dyn LanguageModel>>,
    filter: RelevanceFilter,
    cfg: PipelineConfig,
}

impl RetrievalAnswerPipeline {
    /// `model = None` runs every answer through the fallback path.
    pub fn new(
        store: Arc<dyn ChunkStore>,
        model: Option<Arc<dyn LanguageModel>>,
        cfg: PipelineConfig,
    ) -> Self {
        let filter = RelevanceFilter {
            min_token_len: cfg.min_token_len,
            min_chunk_chars: cfg.min_chunk_chars,
        };
        info!(
            model = model.as_ref().map(|m| m.model_id()).unwrap_or("none"),
            answer_top_k = cfg.answer_top_k,
            "retrieval pipeline ready"
        );
        Self {
            store,
            model,
            filter,
            cfg,
        }
    }

    /// Model id used for primary answers, if a model is configured.
    pub fn model_id(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_id())
    }

    /// Answers `question` from the top `k` (default `answer_top_k`) chunks.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank question or `k == 0`
    /// - `StoreUnavailable` when the primary retrieval fails
    /// - `Model` when the model failed and the fallback retrieval failed too
    #[instrument(skip_all, fields(k = tracing::field::Empty))]
    pub async fn answer(
        &self,
        question: &str,
        k: Option<usize>,
    ) -> Result<AnswerResult, ContextorError> {
        let k = validate(question, k.unwrap_or(self.cfg.answer_top_k))?;
        tracing::Span::current().record("k", k);

        let hits = self.store.similarity_search(question, k).await?;
        let retrieved = hits.len();
        let relevant = self.filter.apply(question, hits);
        debug!(retrieved, relevant = relevant.len(), "relevance filter applied");

        if relevant.is_empty() {
            return Ok(no_context(MODEL_NONE));
        }

        let failure = match &self.model {
            Some(model) => match self.complete(model.as_ref(), question, &relevant).await {
                Ok(answer) => {
                    info!(model = model.model_id(), chunks_used = relevant.len(), "answer generated");
                    return Ok(AnswerResult {
                        answer,
                        sources: self.sources(&relevant, self.cfg.preview_chars),
                        model_used: model.model_id().to_string(),
                        context_found: true,
                        chunks_used: relevant.len(),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "model call failed; using fallback answer");
                    e
                }
            },
            None => {
                debug!("no model configured; using fallback answer");
                ModelError::Unavailable("no language model configured".into())
            }
        };

        self.fallback(question, k, failure).await
    }

    /// Raw top-`k` hits (default `search_top_k`), no relevance filtering.
    pub async fn search(
        &self,
        question: &str,
        k: Option<usize>,
    ) -> Result<Vec<ScoredChunk>, ContextorError> {
        let k = validate(question, k.unwrap_or(self.cfg.search_top_k))?;
        let hits = self.store.similarity_search(question, k).await?;
        debug!(k, hits = hits.len(), "search done");
        Ok(hits)
    }

    /// Stores every chunk as-is and returns how many were added.
    pub async fn ingest_chunks(&self, chunks: Vec<Chunk>) -> Result<usize, ContextorError> {
        if chunks.is_empty() {
            return Err(ContextorError::EmptyInput);
        }
        let added = self.store.add_chunks(chunks).await?;
        info!(added, "chunks ingested");
        Ok(added)
    }

    /// Empties the store. Idempotent.
    pub async fn reset(&self) -> Result<(), ContextorError> {
        self.store.clear().await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<PipelineStats, ContextorError> {
        Ok(PipelineStats {
            total_chunks: self.store.size().await?,
            model: self.model_id().map(str::to_string),
        })
    }

    async fn complete(
        &self,
        model: &dyn LanguageModel,
        question: &str,
        relevant: &[ScoredChunk],
    ) -> Result<String, ModelError> {
        let prompt = build_prompt(question, relevant.iter().map(|h| &h.chunk));
        match tokio::time::timeout(self.cfg.model_timeout, model.complete(&prompt)).await {
            Ok(res) => res,
            Err(_) => Err(ModelError::Timeout(self.cfg.model_timeout)),
        }
    }

    /// Degraded answer from a fresh, narrower retrieval.
    ///
    /// A failing store surfaces the original model error.
    async fn fallback(
        &self,
        question: &str,
        k: usize,
        failure: ModelError,
    ) -> Result<AnswerResult, ContextorError> {
        let narrow_k = self.cfg.fallback_top_k.min(k);
        let hits = match self.store.similarity_search(question, narrow_k).await {
            Ok(hits) => hits,
            Err(store_err) => {
                warn!(error = %store_err, "fallback retrieval failed");
                return Err(ContextorError::Model(failure));
            }
        };

        if hits.is_empty() {
            return Ok(no_context(MODEL_FALLBACK));
        }

        let answer = hits
            .iter()
            .map(|h| first_chars(h.chunk.text(), self.cfg.fallback_preview_chars))
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        // Only filter survivors count as sources, even on the degraded path.
        let relevant = self.filter.apply(question, hits);
        if relevant.is_empty() {
            return Ok(no_context(MODEL_FALLBACK));
        }

        info!(chunks_used = relevant.len(), "fallback answer assembled");
        Ok(AnswerResult {
            answer,
            sources: self.sources(&relevant, self.cfg.preview_chars),
            model_used: MODEL_FALLBACK_ENHANCED.to_string(),
            context_found: true,
            chunks_used: relevant.len(),
        })
    }

    fn sources(&self, hits: &[ScoredChunk], preview_chars: usize) -> Vec<SourceRef> {
        hits.iter()
            .map(|h| SourceRef {
                metadata: h.chunk.metadata().clone(),
                preview: preview(h.chunk.text(), preview_chars),
            })
            .collect()
    }
}

fn validate(question: &str, k: usize) -> Result<usize, ContextorError> {
    if question.trim().is_empty() {
        return Err(ContextorError::InvalidInput("question must not be empty".into()));
    }
    if k == 0 {
        return Err(ContextorError::InvalidInput("k must be a positive integer".into()));
    }
    Ok(k)
}

fn no_context(model_used: &str) -> AnswerResult {
    AnswerResult {
        answer: NO_RELEVANT_INFO.to_string(),
        sources: Vec::new(),
        model_used: model_used.to_string(),
        context_found: false,
        chunks_used: 0,
    }
}
