//! Public API types re-used by external crates (e.g., the HTTP API layer).

use rag_store::Metadata;
use serde::Serialize;

/// `model_used` when nothing survived the relevance filter.
pub const MODEL_NONE: &str = "none";
/// `model_used` when the model failed and the narrow retrieval found nothing.
pub const MODEL_FALLBACK: &str = "fallback";
/// `model_used` for answers stitched from chunk excerpts without a model.
pub const MODEL_FALLBACK_ENHANCED: &str = "fallback-enhanced";

/// Result of one `answer` call.
///
/// `context_found == false` iff no chunk survived filtering; `sources` is
/// then empty and `answer` is [`crate::prompt::NO_RELEVANT_INFO`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub model_used: String,
    pub context_found: bool,
    pub chunks_used: usize,
}

/// Chunk metadata plus a short text preview, serialized flat.
///
/// # Example
/// ```
/// use contextor::SourceRef;
/// use rag_store::{Metadata, MetadataValue};
/// let mut metadata = Metadata::new();
/// metadata.insert("filename".into(), MetadataValue::from("policy.txt"));
/// let s = SourceRef { metadata, preview: "Our refund...".into() };
/// assert_eq!(s.preview, "Our refund...");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceRef {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub preview: String,
}

/// Figures reported by the statistics endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineStats {
    pub total_chunks: usize,
    /// Model id, or `None` when answers come from the fallback path only.
    pub model: Option<String>,
}
