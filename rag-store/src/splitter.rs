//! Recursive character text splitter.
//!
//! Text is cut at the coarsest separator that occurs (`"\n\n"`, `"\n"`, `" "`),
//! falling back to single characters. Pieces are merged greedily up to
//! `chunk_size` characters, and up to `chunk_overlap` characters of the tail
//! of one chunk are carried into the next. Lengths are counted in `char`s.

use std::collections::VecDeque;

use tracing::trace;

use crate::{config::SplitterConfig, errors::RagError};

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Clone, Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(cfg: SplitterConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        Ok(Self {
            chunk_size: cfg.chunk_size,
            chunk_overlap: cfg.chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits `text` into trimmed, non-empty chunks of at most `chunk_size` chars.
    pub fn split(&self, text: &str) -> Vec<String> {
        let out = self.split_recursive(text, SEPARATORS);
        trace!(input_chars = char_len(text), chunks = out.len(), "text split");
        out
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let sep = separators.get(idx).copied().unwrap_or("");
        let rest = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<String> = if sep.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(sep)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut out = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                out.extend(self.merge(&pending, sep));
                pending.clear();
            }
            if rest.is_empty() {
                let piece = piece.trim();
                if !piece.is_empty() {
                    out.push(piece.to_string());
                }
            } else {
                out.extend(self.split_recursive(&piece, rest));
            }
        }
        if !pending.is_empty() {
            out.extend(self.merge(&pending, sep));
        }
        out
    }

    /// Greedy merge of small pieces with overlap between consecutive chunks.
    fn merge(&self, pieces: &[String], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut docs, &window, sep);

                while total > self.chunk_overlap
                    || (total > 0
                        && total + len + if window.is_empty() { 0 } else { sep_len }
                            > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    let dropped = char_len(front) + if window.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(dropped);
                }
            }

            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joiner;
        }
        push_joined(&mut docs, &window, sep);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, window: &VecDeque<&str>, sep: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(sep);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn short_text_is_one_chunk() {
        let s = splitter(100, 10);
        assert_eq!(s.split("  hello world  "), vec!["hello world".to_string()]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(splitter(100, 10).split(" \n\n \n ").is_empty());
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = splitter(40, 0).split(&text);
        assert_eq!(chunks, vec!["a".repeat(30), "b".repeat(30)]);
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = (0..100).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = splitter(50, 10).split(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));

        for pair in chunks.windows(2) {
            let last = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].split_whitespace().any(|w| w == last),
                "expected `{last}` to be carried into `{}`",
                pair[1]
            );
        }
    }

    #[test]
    fn long_words_are_cut_by_characters() {
        let word = "x".repeat(120);
        let chunks = splitter(50, 0).split(&word);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let text = "ü".repeat(30);
        let chunks = splitter(20, 0).split(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        assert_eq!(chunks.concat(), text);
    }
}
