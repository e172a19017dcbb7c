//! Core data models: chunks, metadata and scored hits.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// Metadata value: string or number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            MetadataValue::Number(_) => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => f.write_str(s),
            MetadataValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl From<usize> for MetadataValue {
    fn from(v: usize) -> Self {
        MetadataValue::Number(v as f64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Number(v)
    }
}

/// Ordered metadata map (stable JSON output).
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A unit of indexed text.
///
/// Immutable once built: fields are only reachable through getters, and the
/// `with_*` builders consume `self`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
    metadata: Metadata,
    source_id: String,
}

impl Chunk {
    /// Builds a chunk; `text` must contain a non-whitespace character.
    pub fn new(text: impl Into<String>, source_id: impl Into<String>) -> Result<Self, RagError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RagError::EmptyChunk);
        }
        Ok(Self {
            text,
            metadata: Metadata::new(),
            source_id: source_id.into(),
        })
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Metadata value rendered as a non-empty string, if present.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .map(ToString::to_string)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A retrieval hit: chunk plus normalized similarity in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(Chunk::new("   \n", "s"), Err(RagError::EmptyChunk)));
    }

    #[test]
    fn metadata_renders_numbers_and_text() {
        let c = Chunk::new("hello", "s1")
            .unwrap()
            .with_meta("filename", "a.txt")
            .with_meta("chunk_index", 2usize)
            .with_meta("title", "");
        assert_eq!(c.meta_str("filename").as_deref(), Some("a.txt"));
        assert_eq!(c.meta_str("chunk_index").as_deref(), Some("2"));
        assert_eq!(c.meta_str("title"), None);
        assert_eq!(c.source_id(), "s1");
    }

    #[test]
    fn metadata_serializes_untagged() {
        let c = Chunk::new("x", "s")
            .unwrap()
            .with_meta("page", 3usize)
            .with_meta("url", "https://example.com");
        let v = serde_json::to_value(c.metadata()).unwrap();
        assert_eq!(v["page"], 3.0);
        assert_eq!(v["url"], "https://example.com");
    }
}
