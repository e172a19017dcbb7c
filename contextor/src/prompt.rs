//! Prompt builder: labeled context blocks, the question, and fixed instructions.

use rag_store::Chunk;

/// Answer returned when no chunk survives the relevance filter.
pub const NO_RELEVANT_INFO: &str = "I could not find relevant information in the uploaded documents to answer your question.";

/// Separator between context blocks and between fallback excerpts.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Label used when a chunk has no filename, title or url.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// System message sent alongside the prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about the user's documents.";

const ANSWER_INSTRUCTIONS: &str = "Answer the question using the context above. \
If the context only partially covers the question, say explicitly which parts are missing. \
Keep the tone natural and conversational.";

/// Metadata keys tried in order for a block label.
const LABEL_KEYS: &[&str] = &["filename", "title", "url"];

pub fn source_label(chunk: &Chunk) -> String {
    LABEL_KEYS
        .iter()
        .find_map(|k| chunk.meta_str(k))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// `[Source i: label]` block for the `i`-th (1-based) chunk.
pub fn context_block(i: usize, chunk: &Chunk) -> String {
    format!("[Source {i}: {}]\n{}\n", source_label(chunk), chunk.text())
}

/// Builds the final prompt from ranked chunks.
///
/// # Example
/// ```
/// # use rag_store::Chunk;
/// # use contextor::prompt::build_prompt;
/// let c = Chunk::new("Refunds within 30 days.", "s").unwrap().with_meta("filename", "policy.txt");
/// let prompt = build_prompt("What is the refund policy?", &[c]);
/// assert!(prompt.contains("[Source 1: policy.txt]"));
/// ```
pub fn build_prompt<'a, I>(question: &str, chunks: I) -> String
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let context = chunks
        .into_iter()
        .enumerate()
        .map(|(i, c)| context_block(i + 1, c))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    format!("Context:\n{context}\n\nQuestion: {question}\n\n{ANSWER_INSTRUCTIONS}")
}

/// First `n` chars of `text`, char-boundary safe.
pub fn first_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Source preview: first `n` chars followed by `...`.
pub fn preview(text: &str, n: usize) -> String {
    format!("{}...", first_chars(text, n))
}
