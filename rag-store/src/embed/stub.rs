use crate::{embed::EmbeddingsProvider, errors::RagError, store::StoreFuture};

/// Deterministic, offline embeddings.
///
/// Each lowercase alphanumeric token is hashed (blake3) into one of `dim`
/// buckets with a hash-derived sign; the result is L2-normalized. Texts that
/// share words therefore land close together, which keeps similarity search
/// meaningful without a model.
#[derive(Clone, Debug)]
pub struct DeterministicStubProvider {
    dim: usize,
}

impl DeterministicStubProvider {
    pub fn new(dim: usize) -> Result<Self, RagError> {
        if dim == 0 {
            return Err(RagError::Config("stub embedding dimension must be > 0".into()));
        }
        Ok(Self { dim })
    }

    /// Synchronous core, shared by `embed` and tests.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        let lower = text.to_lowercase();

        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let mut idx_bytes = [0u8; 8];
            idx_bytes.copy_from_slice(&bytes[..8]);
            let idx = (u64::from_le_bytes(idx_bytes) % self.dim as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl EmbeddingsProvider for DeterministicStubProvider {
    fn embed<'a>(&'a self, text: &'a str) -> StoreFuture<'a, Vec<f32>> {
        Box::pin(async move { Ok(self.vectorize(text)) })
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn same_text_same_vector() {
        let p = DeterministicStubProvider::new(128).unwrap();
        assert_eq!(p.vectorize("Refund policy"), p.vectorize("refund POLICY"));
    }

    #[test]
    fn shared_words_score_higher() {
        let p = DeterministicStubProvider::new(256).unwrap();
        let q = p.vectorize("refund policy");
        let near = p.vectorize("our refund policy allows returns");
        let far = p.vectorize("shipping takes five business days");
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[test]
    fn zero_dim_is_rejected() {
        assert!(DeterministicStubProvider::new(0).is_err());
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let p = DeterministicStubProvider::new(32).unwrap();
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let out = p.embed_batch(&texts).await.unwrap();
        assert_eq!(out[0], p.vectorize("alpha"));
        assert_eq!(out[1], p.vectorize("beta"));
    }
}
