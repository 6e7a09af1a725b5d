//! Raw fallback tier: wrap unparseable output in a single section.

use crate::constants::parser;
use crate::types::{Document, Section, truncate_chars};

/// Build the raw fallback document. Never fails.
///
/// Strips JSON punctuation and a leading `summary:` label, trims, and keeps
/// at most `limit` characters.
pub fn raw_document(raw: &str, fallback_name: &str, limit: usize) -> Document {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"'))
        .collect();
    let stripped = stripped.replace("summary:", "");
    let content = truncate_chars(stripped.trim(), limit, parser::ELLIPSIS);

    Document::new(fallback_name, parser::RAW_SUMMARY).with_sections(vec![
        Section::new(parser::RAW_SECTION_TITLE, content).with_code(parser::RAW_CODE_PLACEHOLDER),
    ])
}
