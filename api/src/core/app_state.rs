use std::{sync::Arc, time::Duration};

use ai_llm_service::{
    AiLlmError, LlmServiceProfiles, config::default_config::{Lookup, process_env},
};
use contextor::{
    ChatProfileModel, ContextorError, LanguageModel, PipelineConfig, RetrievalAnswerPipeline,
};
use rag_store::{
    EmbeddingConfig, InMemoryChunkStore, LoaderError, RagError, SplitterConfig, TextSplitter,
    build_provider, loaders::WebsiteLoader,
};
use thiserror::Error;
use tracing::info;

const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const WEBSITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Startup configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Store(#[from] RagError),

    #[error(transparent)]
    Pipeline(#[from] ContextorError),

    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Listener settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// `API_ADDRESS`, e.g. `127.0.0.1:8000`.
    pub address: String,
    /// `MAX_UPLOAD_BYTES`, request body cap for uploads and fetched pages.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        let max_upload_bytes = match vars("MAX_UPLOAD_BYTES") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: "MAX_UPLOAD_BYTES",
                reason: format!("expected a byte count, got `{v}`"),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        Ok(Self {
            address: vars("API_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into()),
            max_upload_bytes,
        })
    }
}

/// Everything [`AppState::new`] needs, resolved up front.
pub struct AppSettings {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub pipeline: PipelineConfig,
    pub splitter: SplitterConfig,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_lookup(vars)?,
            embedding: EmbeddingConfig::from_lookup(vars)?,
            pipeline: PipelineConfig::from_lookup(vars)?,
            splitter: SplitterConfig::from_lookup(vars)?,
        })
    }
}

/// Shared state for all HTTP handlers.
///
/// Built once at startup and handed to the router as `Arc<AppState>`.
pub struct AppState {
    pub server: ServerConfig,
    pub llm: Arc<LlmServiceProfiles>,
    pub store: Arc<InMemoryChunkStore>,
    pub pipeline: RetrievalAnswerPipeline,
    pub splitter: TextSplitter,
    pub website: WebsiteLoader,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let llm = Arc::new(LlmServiceProfiles::from_env()?);
        Self::new(AppSettings::from_env()?, llm)
    }

    /// Wires store, embedder, model and pipeline from resolved settings.
    pub fn new(settings: AppSettings, llm: Arc<LlmServiceProfiles>) -> Result<Self, ConfigError> {
        let AppSettings {
            server,
            embedding,
            pipeline,
            splitter,
        } = settings;

        let embedder = build_provider(embedding.backend, llm.clone(), embedding.stub_dim)?;
        let store = Arc::new(InMemoryChunkStore::new(embedder));

        let model = ChatProfileModel::new(llm.clone()).map(|m| Arc::new(m) as Arc<dyn LanguageModel>);
        let pipeline = RetrievalAnswerPipeline::new(store.clone(), model, pipeline);

        info!(
            address = %server.address,
            embedder = store.embedder_name(),
            model = pipeline.model_id().unwrap_or("none"),
            "application state initialized"
        );

        let website = WebsiteLoader::new(WEBSITE_TIMEOUT, server.max_upload_bytes)?;

        Ok(Self {
            server,
            llm,
            store,
            pipeline,
            splitter: TextSplitter::new(splitter)?,
            website,
        })
    }

    /// Closes the store; later requests fail with a store error.
    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults_and_overrides() {
        let none = |_: &str| -> Option<String> { None };
        let cfg = ServerConfig::from_lookup(&none).unwrap();
        assert_eq!(cfg.address, DEFAULT_ADDRESS);
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);

        let vars = |k: &str| (k == "MAX_UPLOAD_BYTES").then(|| "1k".to_string());
        assert!(matches!(
            ServerConfig::from_lookup(&vars),
            Err(ConfigError::InvalidVar { var: "MAX_UPLOAD_BYTES", .. })
        ));
    }

    #[test]
    fn state_builds_without_llm() {
        let llm = Arc::new(LlmServiceProfiles::new(None, None, Some(1)).unwrap());
        let settings = AppSettings::from_lookup(&|_: &str| -> Option<String> { None }).unwrap();
        let state = AppState::new(settings, llm).unwrap();
        assert_eq!(state.store.embedder_name(), "stub");
        assert!(state.pipeline.model_id().is_none());
    }
}
