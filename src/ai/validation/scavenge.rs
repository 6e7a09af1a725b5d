//! Recovered tier: pattern-scavenge fields from malformed output.
//!
//! The text is split on every `"title": "` marker; each chunk after the first
//! describes one section. The title runs to the next unescaped quote, and the
//! `content` / `codeExample` strings are looked up inside the same chunk.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::parser;
use crate::types::{Document, Section, unescape_json_fragment};

static RE_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

static RE_TITLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""title"\s*:\s*""#).unwrap());

static RE_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""content"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

static RE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:codeExample|code_example)"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap()
});

/// Scavenge a document from malformed text.
///
/// Returns `None` unless at least one section title was found.
pub fn scavenge_document(raw: &str, fallback_name: &str) -> Option<Document> {
    let sections: Vec<Section> = RE_TITLE_MARKER
        .split(raw)
        .skip(1)
        .map(section_from_chunk)
        .collect();

    if sections.is_empty() {
        return None;
    }

    let summary = capture(&RE_SUMMARY, raw)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| parser::RECOVERED_SUMMARY.to_string());

    Some(Document::new(fallback_name, summary).with_sections(sections))
}

fn section_from_chunk(chunk: &str) -> Section {
    let title = unescape_json_fragment(leading_string(chunk));
    let title = if title.trim().is_empty() {
        parser::UNTITLED_SECTION.to_string()
    } else {
        title
    };

    let content = capture(&RE_CONTENT, chunk).unwrap_or_else(|| parser::MISSING_CONTENT.to_string());
    let code = capture(&RE_CODE, chunk).unwrap_or_default();

    Section::new(title, content).with_code(code)
}

/// Text up to the first unescaped quote, or the whole chunk if unterminated
fn leading_string(chunk: &str) -> &str {
    let mut escape = false;
    for (idx, ch) in chunk.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => return &chunk[..idx],
            _ => {}
        }
    }
    chunk.trim_end()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_json_fragment(m.as_str()))
}
