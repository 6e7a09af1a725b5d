//! JSON Extraction and Repair
//!
//! First two steps of reading LLM output:
//! - Extraction: cut the span from the first `{` to the last `}` (drops prose
//!   and code fences around the payload)
//! - Bounded syntactic repair, applied once after a failed parse:
//!   - close an unterminated string literal
//!   - append missing `]` then missing `}`
//!   - drop trailing commas before a closer
//!
//! Characters inside string literals never count as structure.

use serde_json::Value;
use tracing::debug;

// =============================================================================
// Extraction
// =============================================================================

/// Cut the JSON candidate out of raw text.
///
/// Returns the span from the first `{` through the last `}` inclusive, or
/// the trimmed full text if there is no such pair.
pub fn extract_json_candidate(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// Parses JSON, retrying once after a bounded repair
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Extract, parse and if needed repair.
    ///
    /// Returns `(value, was_repaired)`, or `None` when even the repaired text
    /// is not JSON.
    pub fn parse_or_repair(&self, raw: &str) -> Option<(Value, bool)> {
        let candidate = extract_json_candidate(raw);

        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some((value, false));
        }

        let repaired = self.repair(candidate);
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => {
                debug!("JSON parsed after syntactic repair");
                Some((value, true))
            }
            Err(e) => {
                debug!("JSON repair failed: {}", e);
                None
            }
        }
    }

    /// Like `parse_or_repair` but only accepts JSON objects
    pub fn parse_object(&self, raw: &str) -> Option<(Value, bool)> {
        self.parse_or_repair(raw)
            .filter(|(value, _)| value.is_object())
    }

    /// Apply the bounded repair steps to an extracted candidate.
    ///
    /// Trailing commas are dropped last so a comma exposed by the appended
    /// closers is removed as well.
    pub fn repair(&self, candidate: &str) -> String {
        let closed = close_unterminated_string(candidate);
        let balanced = append_missing_closers(&closed);
        drop_trailing_commas(&balanced)
    }
}

/// Append a `"` when the text has an odd number of unescaped quotes
fn close_unterminated_string(s: &str) -> String {
    let mut quotes = 0usize;
    let mut escape = false;

    for ch in s.chars() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => quotes += 1,
            _ => {}
        }
    }

    let mut result = s.to_string();
    if quotes % 2 == 1 {
        result.push('"');
    }
    result
}

/// Append missing array closers, then missing object closers
fn append_missing_closers(s: &str) -> String {
    let mut braces: i64 = 0;
    let mut brackets: i64 = 0;
    let mut in_string = false;
    let mut escape = false;

    for ch in s.chars() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => braces += 1,
            '}' if !in_string => braces -= 1,
            '[' if !in_string => brackets += 1,
            ']' if !in_string => brackets -= 1,
            _ => {}
        }
    }

    let mut result = s.to_string();
    for _ in 0..brackets.max(0) {
        result.push(']');
    }
    for _ in 0..braces.max(0) {
        result.push('}');
    }
    result
}

/// Drop commas followed only by whitespace and a `]` or `}`
fn drop_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }

        result.push(ch);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_prose_and_fences() {
        let raw = "Here you go:\n```json\n{\"summary\": \"x\"}\n```\nHope this helps!";
        assert_eq!(extract_json_candidate(raw), "{\"summary\": \"x\"}");
    }

    #[test]
    fn test_extract_without_pair_trims() {
        assert_eq!(extract_json_candidate("  plain prose \n"), "plain prose");
        assert_eq!(extract_json_candidate("} backwards {"), "} backwards {");
        assert_eq!(extract_json_candidate(""), "");
    }

    #[test]
    fn test_parse_valid_json() {
        let (value, repaired) = JsonRepairer::new()
            .parse_or_repair(r#"{"key": "value"}"#)
            .unwrap();
        assert!(!repaired);
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let input = r#"{"sections": [{"title": "A"},]}"#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["sections"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_trailing_comma_inside_string_kept() {
        let input = r#"{"a": "x, }", "b": [1,],}"#;
        let (value, _) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert_eq!(value["a"], "x, }");
    }

    #[test]
    fn test_balance_closers() {
        let input = r#"{"files": ["a.rs", "b.rs""#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["files"][1], "b.rs");
    }

    #[test]
    fn test_close_unterminated_string() {
        let input = r#"{"summary": "cut off mid"#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["summary"], "cut off mid");
    }

    #[test]
    fn test_escaped_quote_not_counted() {
        assert_eq!(close_unterminated_string(r#""a \" b""#), r#""a \" b""#);
        assert_eq!(close_unterminated_string(r#""a \" b"#), r#""a \" b""#);
    }

    #[test]
    fn test_closers_ignore_string_contents() {
        assert_eq!(append_missing_closers(r#"{"a": "[{""#), r#"{"a": "[{"}"#);
    }

    #[test]
    fn test_comma_exposed_by_truncation_dropped() {
        let input = r#"{"a": 1, "b": [1, 2,"#;
        let (value, _) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert_eq!(value["b"][1], 2);
    }

    #[test]
    fn test_unrepairable_returns_none() {
        assert!(JsonRepairer::new().parse_or_repair("not json at all").is_none());
        assert!(JsonRepairer::new().parse_or_repair("").is_none());
    }

    #[test]
    fn test_parse_object_rejects_scalars() {
        assert!(JsonRepairer::new().parse_object("42").is_none());
        assert!(JsonRepairer::new().parse_object("[1, 2]").is_none());
        assert!(JsonRepairer::new().parse_object("{}").is_some());
    }
}
