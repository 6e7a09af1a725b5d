//! Strict tier: build a document from a parsed JSON object.

use serde_json::Value;

use crate::constants::parser;
use crate::types::{Document, Section, json_nonempty_string, json_string};

/// Map a parsed JSON object onto a document, filling defaults.
///
/// Returns `None` for anything that is not an object. Section items that are
/// not objects are skipped.
pub fn document_from_value(value: &Value, fallback_name: &str) -> Option<Document> {
    let obj = value.as_object()?;

    let file_path = json_nonempty_string(value, "filePath")
        .or_else(|| json_nonempty_string(value, "file_path"))
        .unwrap_or_else(|| fallback_name.to_string());
    let summary = json_nonempty_string(value, "summary")
        .unwrap_or_else(|| parser::MISSING_SUMMARY.to_string());

    let sections = obj
        .get("sections")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(section_from_value).collect())
        .unwrap_or_default();

    let mut document = Document::new(file_path, summary).with_sections(sections);
    if let Some(language) = json_nonempty_string(value, "language") {
        document.language = language;
    }
    Some(document)
}

fn section_from_value(item: &Value) -> Option<Section> {
    item.as_object()?;

    let title = json_string(item, "title").unwrap_or_else(|| parser::UNTITLED_SECTION.to_string());
    let content =
        json_string(item, "content").unwrap_or_else(|| parser::MISSING_CONTENT.to_string());
    let code = json_string(item, "codeExample")
        .or_else(|| json_string(item, "code_example"))
        .unwrap_or_default();

    Some(Section::new(title, content).with_code(code))
}
