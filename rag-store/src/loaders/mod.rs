//! Loaders turning uploads, raw text and web pages into [`LoadedDocument`]s,
//! and [`split_document`] turning those into store-ready [`Chunk`]s.
//!
//! Supported upload types (by extension): `txt`, `md`/`markdown`, `csv`,
//! `json`, `html`/`htm`, `pdf`.

mod html;
mod website;

use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    errors::LoaderError,
    record::{Chunk, Metadata, MetadataValue},
    splitter::TextSplitter,
};

pub use html::{HtmlText, html_to_text};
pub use website::WebsiteLoader;

/// Title used for raw text submitted without one.
pub const DEFAULT_TEXT_TITLE: &str = "Manual input";

/// Extracted document text with document-level metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDocument {
    pub text: String,
    pub metadata: Metadata,
    /// Deterministic id shared by every chunk of this document.
    pub source_id: String,
}

/// Upload formats recognized by [`load_file`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Markdown,
    Csv,
    Json,
    Html,
    Pdf,
}

impl FileKind {
    /// Detects the kind from the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, LoaderError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "" => Err(LoaderError::UnsupportedFileType(filename.to_string())),
            other => Err(LoaderError::UnsupportedFileType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

/// Extracts text from an uploaded file.
///
/// # Errors
/// - `UnsupportedFileType` for unknown extensions
/// - `Decode` when the bytes are not valid for the detected format
/// - `Empty` when nothing but whitespace was extracted
pub fn load_file(filename: &str, bytes: &[u8]) -> Result<LoadedDocument, LoaderError> {
    let kind = FileKind::from_filename(filename)?;

    let text = match kind {
        FileKind::Text | FileKind::Markdown => utf8(filename, bytes)?.to_string(),
        FileKind::Csv => utf8(filename, bytes)?
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        FileKind::Json => {
            let value: serde_json::Value =
                serde_json::from_slice(bytes).map_err(|e| decode(filename, e))?;
            serde_json::to_string_pretty(&value).map_err(|e| decode(filename, e))?
        }
        FileKind::Html => html_to_text(utf8(filename, bytes)?).content,
        FileKind::Pdf => {
            let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| decode(filename, e))?;
            if text.trim().is_empty() {
                warn!(filename, "no text extracted from PDF; it may be a scanned document");
            }
            text
        }
    };

    if text.trim().is_empty() {
        return Err(LoaderError::Empty(filename.to_string()));
    }

    let mut metadata = Metadata::new();
    metadata.insert("filename".into(), filename.into());
    metadata.insert("file_type".into(), kind.as_str().into());

    debug!(filename, file_type = kind.as_str(), chars = text.chars().count(), "file loaded");

    Ok(LoadedDocument {
        source_id: stable_source_id(&format!("file:{filename}:{}", content_hash(bytes))),
        text,
        metadata,
    })
}

/// Wraps raw text; a blank `title` falls back to [`DEFAULT_TEXT_TITLE`].
pub fn load_text(text: &str, title: Option<&str>) -> Result<LoadedDocument, LoaderError> {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TEXT_TITLE);

    if text.trim().is_empty() {
        return Err(LoaderError::Empty(title.to_string()));
    }

    let mut metadata = Metadata::new();
    metadata.insert("title".into(), title.into());
    metadata.insert("source".into(), "text".into());

    Ok(LoadedDocument {
        source_id: stable_source_id(&format!("text:{title}:{}", content_hash(text.as_bytes()))),
        text: text.to_string(),
        metadata,
    })
}

/// Splits a document into chunks carrying its metadata plus
/// `chunk_index` / `total_chunks`.
pub fn split_document(doc: &LoadedDocument, splitter: &TextSplitter) -> Vec<Chunk> {
    let pieces = splitter.split(&doc.text);
    let total = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .filter_map(|(i, piece)| {
            Chunk::new(piece, doc.source_id.as_str())
                .ok()
                .map(|c| {
                    c.with_metadata(doc.metadata.clone())
                        .with_meta("chunk_index", MetadataValue::from(i))
                        .with_meta("total_chunks", MetadataValue::from(total))
                })
        })
        .collect()
}

/// Deterministic UUIDv5 for a source key.
pub fn stable_source_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()).to_string()
}

fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn utf8<'a>(filename: &str, bytes: &'a [u8]) -> Result<&'a str, LoaderError> {
    std::str::from_utf8(bytes).map_err(|e| decode(filename, e))
}

fn decode(filename: &str, e: impl std::fmt::Display) -> LoaderError {
    LoaderError::Decode {
        name: filename.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitterConfig;

    #[test]
    fn extension_detection() {
        assert_eq!(FileKind::from_filename("Notes.MD").unwrap(), FileKind::Markdown);
        assert_eq!(FileKind::from_filename("page.htm").unwrap(), FileKind::Html);
        assert!(matches!(
            FileKind::from_filename("image.png"),
            Err(LoaderError::UnsupportedFileType(ext)) if ext == "png"
        ));
        assert!(FileKind::from_filename("README").is_err());
    }

    #[test]
    fn text_file_keeps_content_and_metadata() {
        let doc = load_file("policy.txt", b"Refunds within 30 days.").unwrap();
        assert_eq!(doc.text, "Refunds within 30 days.");
        assert_eq!(doc.metadata["filename"].as_str(), Some("policy.txt"));
        assert_eq!(doc.metadata["file_type"].as_str(), Some("txt"));
    }

    #[test]
    fn csv_drops_blank_lines() {
        let doc = load_file("t.csv", b"a,b\n\n1,2\n  \n3,4\n").unwrap();
        assert_eq!(doc.text, "a,b\n1,2\n3,4");
    }

    #[test]
    fn json_is_pretty_printed() {
        let doc = load_file("d.json", br#"{"k":[1,2]}"#).unwrap();
        assert!(doc.text.contains("\"k\": ["));
        assert!(matches!(load_file("bad.json", b"{nope"), Err(LoaderError::Decode { .. })));
    }

    #[test]
    fn invalid_utf8_and_empty_files_are_rejected() {
        assert!(matches!(load_file("x.txt", &[0xff, 0xfe]), Err(LoaderError::Decode { .. })));
        assert!(matches!(load_file("x.md", b"  \n"), Err(LoaderError::Empty(_))));
    }

    #[test]
    fn text_title_defaults() {
        let doc = load_text("some body", None).unwrap();
        assert_eq!(doc.metadata["title"].as_str(), Some(DEFAULT_TEXT_TITLE));
        assert_eq!(doc.metadata["source"].as_str(), Some("text"));

        let doc = load_text("some body", Some("  ")).unwrap();
        assert_eq!(doc.metadata["title"].as_str(), Some(DEFAULT_TEXT_TITLE));
    }

    #[test]
    fn source_ids_are_stable() {
        let a = load_text("same", Some("t")).unwrap();
        let b = load_text("same", Some("t")).unwrap();
        let c = load_text("other", Some("t")).unwrap();
        assert_eq!(a.source_id, b.source_id);
        assert_ne!(a.source_id, c.source_id);
    }

    #[test]
    fn split_document_numbers_chunks() {
        let splitter = TextSplitter::new(SplitterConfig {
            chunk_size: 40,
            chunk_overlap: 0,
        })
        .unwrap();
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(30), "b".repeat(30), "c".repeat(30));
        let doc = load_file("abc.txt", text.as_bytes()).unwrap();

        let chunks = split_document(&doc, &splitter);
        assert_eq!(chunks.len(), 3);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.meta_str("chunk_index"), Some(i.to_string()));
            assert_eq!(c.meta_str("total_chunks").as_deref(), Some("3"));
            assert_eq!(c.meta_str("filename").as_deref(), Some("abc.txt"));
            assert_eq!(c.source_id(), doc.source_id);
        }
    }
}
