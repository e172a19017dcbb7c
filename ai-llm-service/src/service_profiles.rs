//! Shared LLM service with two optional profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//! - A missing profile is reported as [`AiLlmError::ProfileNotConfigured`] on use.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//!
//! if svc.chat_profile().is_some() {
//!     let txt = svc.generate("Hello world", None).await?;
//!     println!("{txt}");
//! }
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    config::{
        default_config::{chat_config_from_env, embedding_config_from_env},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service that manages the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat: Option<LlmModelConfig>,
    embedding: Option<LlmModelConfig>,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service from explicit profiles.
    ///
    /// `health_timeout_secs` bounds each health probe (default 10s).
    pub fn new(
        chat: Option<LlmModelConfig>,
        embedding: Option<LlmModelConfig>,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        info!(
            chat = %chat.as_ref().map(LlmModelConfig::tag).unwrap_or_else(|| "disabled".into()),
            embedding = %embedding.as_ref().map(LlmModelConfig::tag).unwrap_or_else(|| "disabled".into()),
            "LLM profiles configured"
        );

        Ok(Self {
            chat,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Resolves both profiles from the process environment.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(chat_config_from_env()?, embedding_config_from_env()?, None)
    }

    /// The chat profile, if configured.
    pub fn chat_profile(&self) -> Option<&LlmModelConfig> {
        self.chat.as_ref()
    }

    /// The embedding profile, if configured.
    pub fn embedding_profile(&self) -> Option<&LlmModelConfig> {
        self.embedding.as_ref()
    }

    /// Generates text with the **chat** profile.
    ///
    /// `system` is forwarded as a system message on OpenAI and prepended to the
    /// prompt on Ollama.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let cfg = self
            .chat
            .as_ref()
            .ok_or(AiLlmError::ProfileNotConfigured("chat"))?;

        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(cfg).await?;
                match system {
                    Some(sys) => cli.generate(&format!("{sys}\n\n{prompt}")).await,
                    None => cli.generate(prompt).await,
                }
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(cfg).await?;
                cli.generate(prompt, system).await
            }
        }
    }

    /// Computes one embedding with the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let cfg = self.embedding_cfg()?;
        match cfg.provider {
            LlmProvider::Ollama => self.get_or_init_ollama(cfg).await?.embeddings(input).await,
            LlmProvider::OpenAI => self.get_or_init_openai(cfg).await?.embeddings(input).await,
        }
    }

    /// Computes embeddings for a batch.
    ///
    /// OpenAI receives a single batched request; Ollama is called per input.
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        let cfg = self.embedding_cfg()?;
        match cfg.provider {
            LlmProvider::OpenAI => {
                self.get_or_init_openai(cfg)
                    .await?
                    .embeddings_batch(inputs)
                    .await
            }
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(cfg).await?;
                let mut out = Vec::with_capacity(inputs.len());
                for input in inputs {
                    out.push(cli.embeddings(input).await?);
                }
                Ok(out)
            }
        }
    }

    /// Returns a health snapshot for every distinct configured profile.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        if let Some(chat) = &self.chat {
            list.push(chat.clone());
        }
        if let Some(emb) = &self.embedding {
            if self.chat.as_ref() != Some(emb) {
                list.push(emb.clone());
            }
        }
        self.health.check_many(&list).await
    }

    /* --------------------- Internals --------------------- */

    fn embedding_cfg(&self) -> Result<&LlmModelConfig, AiLlmError> {
        self.embedding
            .as_ref()
            .ok_or(AiLlmError::ProfileNotConfigured("embedding"))
    }

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        debug!(model = %cfg.model, "creating Ollama client");
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        debug!(model = %cfg.model, "creating OpenAI client");
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_profiles_are_reported() {
        let svc = LlmServiceProfiles::new(None, None, Some(1)).unwrap();

        let err = svc.generate("hi", None).await.unwrap_err();
        assert!(matches!(err, AiLlmError::ProfileNotConfigured("chat")));

        let err = svc.embed("hi").await.unwrap_err();
        assert!(matches!(err, AiLlmError::ProfileNotConfigured("embedding")));

        assert!(svc.health_all().await.is_empty());
    }
}
