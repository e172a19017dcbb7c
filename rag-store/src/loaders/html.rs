//! Visible-text extraction from HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Elements whose text is never shown to a reader.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Preferred content containers, most specific first.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=main]", "#content", ".content", "body"];

/// Below this many chars a content container is considered boilerplate.
const MIN_CONTENT_CHARS: usize = 100;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HtmlText {
    /// `<title>`, falling back to the first `<h1>`.
    pub title: Option<String>,
    /// One line per visible text node, whitespace collapsed.
    pub content: String,
}

pub fn html_to_text(html: &str) -> HtmlText {
    let doc = Html::parse_document(html);
    HtmlText {
        title: first_text(&doc, "title").or_else(|| first_text(&doc, "h1")),
        content: main_content(&doc),
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = doc.select(&sel).next()?;
    let text = collapse(&el.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn main_content(doc: &Html) -> String {
    let mut fallback = String::new();
    for raw in CONTENT_SELECTORS {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            let text = visible_text(el);
            if text.chars().count() > MIN_CONTENT_CHARS {
                return text;
            }
            if fallback.is_empty() {
                fallback = text;
            }
        }
    }
    if fallback.is_empty() {
        visible_text(doc.root_element())
    } else {
        fallback
    }
}

fn visible_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN.contains(&e.name()))
            });
            if hidden {
                return None;
            }
            let line = collapse(text);
            (!line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}
