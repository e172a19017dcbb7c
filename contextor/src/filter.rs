//! Lexical relevance gate applied to vector hits before prompting.
//!
//! A hit survives when its lowercased text contains at least one significant
//! question token and its trimmed text is long enough to carry an answer.
//! Rank order is preserved.

use rag_store::ScoredChunk;

#[derive(Clone, Copy, Debug)]
pub struct RelevanceFilter {
    /// Tokens must be strictly longer than this (in chars).
    pub min_token_len: usize,
    /// Trimmed chunk text must be strictly longer than this (in chars).
    pub min_chunk_chars: usize,
}

impl RelevanceFilter {
    /// Lowercased question words longer than `min_token_len`, deduplicated in order.
    pub fn significant_tokens(&self, question: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tok in question
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() > self.min_token_len)
            .map(str::to_lowercase)
        {
            if !out.contains(&tok) {
                out.push(tok);
            }
        }
        out
    }

    pub fn is_relevant(&self, text: &str, tokens: &[String]) -> bool {
        if text.trim().chars().count() <= self.min_chunk_chars {
            return false;
        }
        let lower = text.to_lowercase();
        tokens.iter().any(|t| lower.contains(t.as_str()))
    }

    pub fn apply(&self, question: &str, hits: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        let tokens = self.significant_tokens(question);
        hits.into_iter()
            .filter(|h| self.is_relevant(h.chunk.text(), &tokens))
            .collect()
    }
}
