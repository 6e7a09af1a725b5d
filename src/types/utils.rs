//! Shared utility functions.
//!
//! ## JSON Extraction Helpers
//!
//! Ergonomic helpers for pulling values out of `serde_json::Value`:
//! - `json_string`, `json_string_or` - Extract strings
//! - `json_nonempty_string` - Extract strings, treating `""` as absent
//!
//! ## Text Helpers
//!
//! - `truncate_chars` - Char-boundary-safe truncation with a marker
//! - `truncate_for_prompt` - Line-aware truncation of source for prompts
//! - `unescape_json_fragment` - Decode the inside of a JSON string literal

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
#[inline]
pub fn json_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract string with default value.
#[inline]
pub fn json_string_or(value: &serde_json::Value, key: &str, default: &str) -> String {
    json_string(value, key).unwrap_or_else(|| default.to_string())
}

/// Extract string, treating empty or whitespace-only values as absent.
#[inline]
pub fn json_nonempty_string(value: &serde_json::Value, key: &str) -> Option<String> {
    json_string(value, key).filter(|s| !s.trim().is_empty())
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Truncate to at most `max_chars` characters, appending `marker` when cut.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], marker),
        None => text.to_string(),
    }
}

/// Truncate source text for inclusion in a prompt.
///
/// Breaks at the last line boundary inside the budget when there is one.
pub fn truncate_for_prompt(content: &str, max_chars: usize) -> String {
    let Some((byte_idx, _)) = content.char_indices().nth(max_chars) else {
        return content.to_string();
    };

    let truncated = &content[..byte_idx];
    let cut = truncated.rfind('\n').unwrap_or(truncated.len());

    format!("{}\n// ... [truncated]", &content[..cut])
}

/// Decode the inside of a JSON string literal (without surrounding quotes).
///
/// Full JSON unescaping when the fragment is well formed; otherwise only the
/// `\n`, `\t`, `\"` and `\\` sequences are replaced.
pub fn unescape_json_fragment(fragment: &str) -> String {
    if let Ok(decoded) = serde_json::from_str::<String>(&format!("\"{}\"", fragment)) {
        return decoded;
    }

    fragment
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string_helpers() {
        let value = json!({"a": "x", "b": "  ", "c": 3});
        assert_eq!(json_string(&value, "a").as_deref(), Some("x"));
        assert_eq!(json_string(&value, "c"), None);
        assert_eq!(json_string_or(&value, "missing", "d"), "d");
        assert_eq!(json_nonempty_string(&value, "b"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10, "..."), "hello");
        assert_eq!(truncate_chars("hello", 5, "..."), "hello");
        assert_eq!(truncate_chars("hello world", 5, "..."), "hello...");
        // multi-byte characters are never split
        assert_eq!(truncate_chars("ééééé", 2, "…"), "éé…");
    }

    #[test]
    fn test_truncate_for_prompt_breaks_on_line() {
        let content = "line one\nline two\nline three";
        let out = truncate_for_prompt(content, 12);
        assert!(out.starts_with("line one\n"));
        assert!(!out.contains("line two"));
        assert!(out.ends_with("[truncated]"));
        assert_eq!(truncate_for_prompt("short", 100), "short");
    }

    #[test]
    fn test_unescape_json_fragment() {
        assert_eq!(unescape_json_fragment(r#"a\nb \"q\""#), "a\nb \"q\"");
        assert_eq!(unescape_json_fragment(r"tab\there"), "tab\there");
        // invalid escape falls back to the light replacement
        assert_eq!(unescape_json_fragment(r"bad \x and\n"), "bad \\x and\n");
    }
}
