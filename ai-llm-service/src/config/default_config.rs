//! LLM profile configs resolved from environment variables.
//!
//! Two roles are resolved independently:
//!
//! - **Chat**      → answer generation
//! - **Embedding** → vectorizing chunks and queries
//!
//! A role that lacks its credentials resolves to `Ok(None)`: the backend still
//! starts, and callers degrade (fallback answers, stub embeddings). Malformed
//! values are hard errors.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_PROVIDER`     = `openai` (default) | `ollama`
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TEMPERATURE`  = optional temperature (0.0..=2.0, default 0.7)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (default 60)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`          = required for both roles
//! - `OPENAI_BASE_URL`         = default `https://api.openai.com`
//! - `OPENAI_MODEL`            = default `gpt-3.5-turbo`
//! - `OPENAI_EMBEDDING_MODEL`  = default `text-embedding-ada-002`
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint
//! - `OLLAMA_MODEL`                = chat model
//! - `EMBEDDING_MODEL`             = embedding model

use tracing::info;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, Result, validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Variable lookup used by the resolvers; `std::env` in production, a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads a variable from the process environment, treating blank values as unset.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolves the chat profile from the process environment.
pub fn chat_config_from_env() -> Result<Option<LlmModelConfig>> {
    chat_config_with(&process_env)
}

/// Resolves the embedding profile from the process environment.
pub fn embedding_config_from_env() -> Result<Option<LlmModelConfig>> {
    embedding_config_with(&process_env)
}

/// Resolves the chat profile from an arbitrary lookup.
pub fn chat_config_with(vars: Lookup<'_>) -> Result<Option<LlmModelConfig>> {
    let provider = provider(vars)?;
    let max_tokens = opt_u32(vars, "LLM_MAX_TOKENS")?;
    let temperature = opt_f32(vars, "LLM_TEMPERATURE")?.unwrap_or(0.7);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let timeout_secs = opt_u64(vars, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cfg = match provider {
        LlmProvider::OpenAI => {
            let Some(api_key) = get(vars, "OPENAI_API_KEY") else {
                info!("OPENAI_API_KEY not set; chat profile disabled");
                return Ok(None);
            };
            LlmModelConfig {
                provider,
                model: get(vars, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
                endpoint: openai_endpoint(vars)?,
                api_key: Some(api_key),
                max_tokens,
                temperature: Some(temperature),
                timeout_secs: Some(timeout_secs),
            }
        }
        LlmProvider::Ollama => {
            let Some(endpoint) = ollama_endpoint(vars)? else {
                info!("OLLAMA_URL/OLLAMA_PORT not set; chat profile disabled");
                return Ok(None);
            };
            let Some(model) = get(vars, "OLLAMA_MODEL") else {
                info!("OLLAMA_MODEL not set; chat profile disabled");
                return Ok(None);
            };
            LlmModelConfig {
                provider,
                model,
                endpoint,
                api_key: None,
                max_tokens,
                temperature: Some(temperature),
                timeout_secs: Some(timeout_secs),
            }
        }
    };

    Ok(Some(cfg))
}

/// Resolves the embedding profile from an arbitrary lookup.
///
/// Deterministic (`temperature = 0.0`) and with a shorter default timeout.
pub fn embedding_config_with(vars: Lookup<'_>) -> Result<Option<LlmModelConfig>> {
    let provider = provider(vars)?;
    let timeout_secs = Some(DEFAULT_EMBEDDING_TIMEOUT_SECS);

    let cfg = match provider {
        LlmProvider::OpenAI => {
            let Some(api_key) = get(vars, "OPENAI_API_KEY") else {
                return Ok(None);
            };
            LlmModelConfig {
                provider,
                model: get(vars, "OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_EMBEDDING_MODEL.into()),
                endpoint: openai_endpoint(vars)?,
                api_key: Some(api_key),
                max_tokens: None,
                temperature: Some(0.0),
                timeout_secs,
            }
        }
        LlmProvider::Ollama => {
            let (Some(endpoint), Some(model)) =
                (ollama_endpoint(vars)?, get(vars, "EMBEDDING_MODEL"))
            else {
                return Ok(None);
            };
            LlmModelConfig {
                provider,
                model,
                endpoint,
                api_key: None,
                max_tokens: None,
                temperature: Some(0.0),
                timeout_secs,
            }
        }
    };

    Ok(Some(cfg))
}

fn provider(vars: Lookup<'_>) -> Result<LlmProvider> {
    match get(vars, "LLM_PROVIDER") {
        Some(p) => Ok(p.parse()?),
        None => Ok(LlmProvider::OpenAI),
    }
}

fn openai_endpoint(vars: Lookup<'_>) -> Result<String> {
    let url = get(vars, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into());
    validate_http_endpoint("OPENAI_BASE_URL", &url)?;
    Ok(url)
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint(vars: Lookup<'_>) -> Result<Option<String>> {
    if let Some(url) = get(vars, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(Some(url));
    }
    if let Some(port) = get(vars, "OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(Some(format!("http://localhost:{}", port.trim())));
    }
    Ok(None)
}

fn get(vars: Lookup<'_>, name: &str) -> Option<String> {
    vars(name).filter(|v| !v.trim().is_empty())
}

fn opt_u32(vars: Lookup<'_>, name: &'static str) -> Result<Option<u32>> {
    get(vars, name)
        .map(|v| {
            v.trim().parse::<u32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected u32",
                })
            })
        })
        .transpose()
}

fn opt_u64(vars: Lookup<'_>, name: &'static str) -> Result<Option<u64>> {
    get(vars, name)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected u64",
                })
            })
        })
        .transpose()
}

fn opt_f32(vars: Lookup<'_>, name: &'static str) -> Result<Option<f32>> {
    get(vars, name)
        .map(|v| {
            v.trim().parse::<f32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected a float",
                })
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn openai_without_key_disables_both_profiles() {
        let env = vars(&[("OPENAI_MODEL", "gpt-4o-mini")]);
        let lookup = |k: &str| env.get(k).cloned();
        assert!(chat_config_with(&lookup).unwrap().is_none());
        assert!(embedding_config_with(&lookup).unwrap().is_none());
    }

    #[test]
    fn openai_defaults_are_applied() {
        let env = vars(&[("OPENAI_API_KEY", "sk-test")]);
        let lookup = |k: &str| env.get(k).cloned();

        let chat = chat_config_with(&lookup).unwrap().unwrap();
        assert_eq!(chat.provider, LlmProvider::OpenAI);
        assert_eq!(chat.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(chat.endpoint, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(chat.timeout_secs, Some(60));

        let emb = embedding_config_with(&lookup).unwrap().unwrap();
        assert_eq!(emb.model, DEFAULT_OPENAI_EMBEDDING_MODEL);
        assert_eq!(emb.temperature, Some(0.0));
    }

    #[test]
    fn ollama_port_builds_localhost_endpoint() {
        let env = vars(&[
            ("LLM_PROVIDER", "ollama"),
            ("OLLAMA_PORT", "11434"),
            ("OLLAMA_MODEL", "llama3"),
        ]);
        let lookup = |k: &str| env.get(k).cloned();

        let chat = chat_config_with(&lookup).unwrap().unwrap();
        assert_eq!(chat.endpoint, "http://localhost:11434");
        assert!(embedding_config_with(&lookup).unwrap().is_none());
    }

    #[test]
    fn malformed_values_are_errors() {
        let env = vars(&[
            ("LLM_PROVIDER", "ollama"),
            ("OLLAMA_PORT", "not-a-port"),
            ("OLLAMA_MODEL", "llama3"),
        ]);
        let lookup = |k: &str| env.get(k).cloned();
        assert!(chat_config_with(&lookup).is_err());

        let env = vars(&[("OPENAI_API_KEY", "sk"), ("LLM_TEMPERATURE", "9.5")]);
        let lookup = |k: &str| env.get(k).cloned();
        assert!(chat_config_with(&lookup).is_err());
    }
}
