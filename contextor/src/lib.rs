//! Retrieval-and-answer pipeline over a shared chunk store.
//!
//! Public API: [`RetrievalAnswerPipeline`]. `answer` retrieves top-k chunks,
//! drops lexically unrelated or near-empty hits, builds a labeled prompt,
//! calls the language model once, and degrades to a deterministic excerpt
//! answer when the model fails, times out, or is not configured.

pub mod cfg;
mod error;
mod filter;
pub mod llm;
mod pipeline;
pub mod prompt;

mod api_types;

pub use api_types::{
    AnswerResult, MODEL_FALLBACK, MODEL_FALLBACK_ENHANCED, MODEL_NONE, PipelineStats, SourceRef,
};
pub use cfg::PipelineConfig;
pub use error::ContextorError;
pub use filter::RelevanceFilter;
pub use llm::{ChatProfileModel, LanguageModel, ModelError, ModelFuture};
pub use pipeline::RetrievalAnswerPipeline;
