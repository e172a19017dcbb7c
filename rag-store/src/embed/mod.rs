//! Embedding providers.
//!
//! Two variants implement [`EmbeddingsProvider`]:
//! - [`RealEmbeddingProvider`]: delegates to the LLM service embedding profile.
//! - [`DeterministicStubProvider`]: hashed bag-of-words vectors, no network.
//!
//! The variant is chosen once at startup through [`EmbeddingBackend`].

mod real;
mod stub;

use std::{str::FromStr, sync::Arc};

use ai_llm_service::LlmServiceProfiles;
use tracing::info;

use crate::{errors::RagError, store::StoreFuture};

pub use real::RealEmbeddingProvider;
pub use stub::DeterministicStubProvider;

/// Provider interface for embedding generation.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds one text.
    fn embed<'a>(&'a self, text: &'a str) -> StoreFuture<'a, Vec<f32>>;

    /// Embeds a batch, preserving order. Default: sequential `embed` calls.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> StoreFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        })
    }

    /// Fixed dimensionality, when known up front.
    fn dimension(&self) -> Option<usize>;

    /// Short name for logs and `/stats`.
    fn name(&self) -> &str;
}

/// Which embedding provider to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingBackend {
    Real,
    Stub,
}

impl FromStr for EmbeddingBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "stub" | "fake" => Ok(Self::Stub),
            other => Err(RagError::Config(format!(
                "unknown embedding backend `{other}` (expected `real` or `stub`)"
            ))),
        }
    }
}

/// Builds the provider for `backend`.
///
/// `None` means "real if an embedding profile is configured, stub otherwise";
/// this is decided here, once, from configuration.
///
/// # Errors
/// `RagError::Config` when `Real` is requested without an embedding profile.
pub fn build_provider(
    backend: Option<EmbeddingBackend>,
    svc: Arc<LlmServiceProfiles>,
    stub_dim: usize,
) -> Result<Arc<dyn EmbeddingsProvider>, RagError> {
    let backend = backend.unwrap_or(if svc.embedding_profile().is_some() {
        EmbeddingBackend::Real
    } else {
        EmbeddingBackend::Stub
    });

    let provider: Arc<dyn EmbeddingsProvider> = match backend {
        EmbeddingBackend::Real => Arc::new(RealEmbeddingProvider::new(svc)?),
        EmbeddingBackend::Stub => Arc::new(DeterministicStubProvider::new(stub_dim)?),
    };

    info!(provider = provider.name(), "embedding provider selected");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing() {
        assert_eq!("REAL".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Real);
        assert_eq!("stub".parse::<EmbeddingBackend>().unwrap(), EmbeddingBackend::Stub);
        assert!("openai".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn defaults_to_stub_without_profile() {
        let svc = Arc::new(LlmServiceProfiles::new(None, None, Some(1)).unwrap());
        let p = build_provider(None, svc.clone(), 64).unwrap();
        assert_eq!(p.name(), "stub");
        assert_eq!(p.dimension(), Some(64));

        assert!(build_provider(Some(EmbeddingBackend::Real), svc, 64).is_err());
    }
}
