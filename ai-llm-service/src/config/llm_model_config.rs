use crate::config::llm_provider::LlmProvider;

/// Configuration for one LLM profile (chat or embedding).
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-3.5-turbo".to_string(),
///     endpoint: "https://api.openai.com".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: Some(1024),
///     temperature: Some(0.7),
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.model, "gpt-3.5-turbo");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The provider/backend.
    pub provider: LlmProvider,

    /// Model identifier (e.g. `"gpt-3.5-turbo"`, `"llama3"`).
    pub model: String,

    /// Base URL of the provider, without the API path.
    pub endpoint: String,

    /// API key for providers that require authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Short `provider:model` tag used in logs and in answer metadata.
    pub fn tag(&self) -> String {
        format!("{}:{}", self.provider, self.model)
    }
}
