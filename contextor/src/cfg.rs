//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use ai_llm_service::config::default_config::Lookup;

use crate::error::ContextorError;

/// Pipeline knobs. All fields have defaults via [`PipelineConfig::default`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Fan-out of `answer` when the caller gives none.
    pub answer_top_k: usize,
    /// Fan-out of `search` when the caller gives none.
    pub search_top_k: usize,
    /// Upper bound of the narrow re-retrieval on the fallback path.
    pub fallback_top_k: usize,

    // Relevance filter
    pub min_token_len: usize,
    pub min_chunk_chars: usize,

    pub preview_chars: usize,
    pub fallback_preview_chars: usize,

    pub model_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            answer_top_k: 8,
            search_top_k: 5,
            fallback_top_k: 3,
            min_token_len: 3,
            min_chunk_chars: 50,
            preview_chars: 200,
            fallback_preview_chars: 300,
            model_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    /// Build from an arbitrary variable source; unset variables keep defaults.
    ///
    /// # Example
    /// ```
    /// # use contextor::PipelineConfig;
    /// let vars = |k: &str| (k == "ANSWER_TOP_K").then(|| "4".to_string());
    /// let cfg = PipelineConfig::from_lookup(&vars).unwrap();
    /// assert_eq!(cfg.answer_top_k, 4);
    /// assert_eq!(cfg.search_top_k, 5);
    /// ```
    pub fn from_lookup(vars: Lookup<'_>) -> Result<Self, ContextorError> {
        let d = Self::default();
        let cfg = Self {
            answer_top_k: parse(vars, "ANSWER_TOP_K", d.answer_top_k)?,
            search_top_k: parse(vars, "SEARCH_TOP_K", d.search_top_k)?,
            fallback_top_k: parse(vars, "FALLBACK_TOP_K", d.fallback_top_k)?,
            min_token_len: parse(vars, "RELEVANCE_MIN_TOKEN_LEN", d.min_token_len)?,
            min_chunk_chars: parse(vars, "RELEVANCE_MIN_CHUNK_CHARS", d.min_chunk_chars)?,
            preview_chars: parse(vars, "PREVIEW_CHARS", d.preview_chars)?,
            fallback_preview_chars: parse(vars, "FALLBACK_PREVIEW_CHARS", d.fallback_preview_chars)?,
            model_timeout: Duration::from_secs(parse(
                vars,
                "MODEL_TIMEOUT_SECS",
                d.model_timeout.as_secs() as usize,
            )? as u64),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ContextorError> {
        for (name, v) in [
            ("ANSWER_TOP_K", self.answer_top_k),
            ("SEARCH_TOP_K", self.search_top_k),
            ("FALLBACK_TOP_K", self.fallback_top_k),
        ] {
            if v == 0 {
                return Err(ContextorError::Config(format!("{name} must be >= 1")));
            }
        }
        if self.model_timeout.is_zero() {
            return Err(ContextorError::Config("MODEL_TIMEOUT_SECS must be >= 1".into()));
        }
        Ok(())
    }
}

fn parse(vars: Lookup<'_>, name: &str, dflt: usize) -> Result<usize, ContextorError> {
    match vars(name) {
        Some(v) => v.trim().parse().map_err(|_| {
            ContextorError::Config(format!("{name}: expected a non-negative integer, got `{v}`"))
        }),
        None => Ok(dflt),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn overrides_and_defaults() {
        let map: HashMap<&str, &str> =
            [("ANSWER_TOP_K", "4"), ("RELEVANCE_MIN_CHUNK_CHARS", "10"), ("MODEL_TIMEOUT_SECS", "5")]
                .into_iter()
                .collect();
        let vars = |k: &str| map.get(k).map(|v| v.to_string());

        let cfg = PipelineConfig::from_lookup(&vars).unwrap();
        assert_eq!(cfg.answer_top_k, 4);
        assert_eq!(cfg.min_chunk_chars, 10);
        assert_eq!(cfg.model_timeout, Duration::from_secs(5));
        assert_eq!(cfg.search_top_k, 5);
        assert_eq!(cfg.min_token_len, 3);
    }

    #[test]
    fn zero_fan_out_is_rejected() {
        let vars = |k: &str| (k == "SEARCH_TOP_K").then(|| "0".to_string());
        assert!(matches!(PipelineConfig::from_lookup(&vars), Err(ContextorError::Config(_))));

        let vars = |k: &str| (k == "PREVIEW_CHARS").then(|| "lots".to_string());
        assert!(matches!(PipelineConfig::from_lookup(&vars), Err(ContextorError::Config(_))));
    }
}
