//! Language model seam used by the pipeline, plus the adapter over the
//! shared LLM service chat profile.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use ai_llm_service::{AiLlmError, LlmServiceProfiles};
use thiserror::Error;
use tracing::debug;

use crate::prompt::SYSTEM_PROMPT;

pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ModelError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("model timed out after {0:?}")]
    Timeout(Duration),
}

/// Text completion backend. One call per answer; no retries.
pub trait LanguageModel: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> ModelFuture<'a>;

    /// Identifier reported as `model_used`.
    fn model_id(&self) -> &str;
}

/// [`LanguageModel`] backed by the chat profile of [`LlmServiceProfiles`].
pub struct ChatProfileModel {
    svc: Arc<LlmServiceProfiles>,
    model_id: String,
    timeout: Duration,
}

impl ChatProfileModel {
    /// `None` when no chat profile is configured.
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Option<Self> {
        let profile = svc.chat_profile()?;
        let model_id = profile.model.clone();
        let timeout = Duration::from_secs(profile.timeout_secs.unwrap_or(60));
        Some(Self {
            svc,
            model_id,
            timeout,
        })
    }
}

impl LanguageModel for ChatProfileModel {
    fn complete<'a>(&'a self, prompt: &'a str) -> ModelFuture<'a> {
        Box::pin(async move {
            debug!(model = %self.model_id, prompt_len = prompt.len(), "requesting completion");
            self.svc
                .generate(prompt, Some(SYSTEM_PROMPT))
                .await
                .map_err(|e| classify(e, self.timeout))
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Transport timeouts carry no duration, so the client timeout is reported.
fn classify(e: AiLlmError, client_timeout: Duration) -> ModelError {
    match e {
        AiLlmError::Timeout(d) => ModelError::Timeout(d),
        other if other.is_timeout() => ModelError::Timeout(client_timeout),
        other => ModelError::Unavailable(other.to_string()),
    }
}
