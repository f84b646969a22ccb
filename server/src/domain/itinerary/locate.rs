//! Locate and parse a JSON object embedded in free-form model output
//!
//! Strategies, in order:
//! 1. Content between `===JSON_START===` / `===JSON_END===` markers
//! 2. First balanced `{ ... }` region, string-aware first, then a plain
//!    depth count for double-escaped text the string-aware scan cannot close
//!
//! Each candidate is parsed directly, then once more after decoding literal
//! backslash escapes (some transports double-escape the model text).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use super::fence::strip_code_fences;

pub const JSON_START_MARKER: &str = "===JSON_START===";
pub const JSON_END_MARKER: &str = "===JSON_END===";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)===JSON_START===\s*(\{.*?\})\s*===JSON_END===").expect("marker regex is valid")
});

/// Find and parse the JSON object embedded in `text`.
///
/// Never fails: returns `None` when no candidate parses to an object.
pub fn extract_json_object(text: &str) -> Option<Map<String, JsonValue>> {
    if text.is_empty() {
        return None;
    }
    let text = strip_code_fences(text).trim();

    if let Some(candidate) = MARKER_RE.captures(text).and_then(|c| c.get(1)) {
        if let Some(obj) = parse_object_lenient(candidate.as_str()) {
            tracing::debug!(strategy = "markers", "Located JSON object");
            return Some(obj);
        }
        tracing::debug!("Marker-wrapped JSON failed to parse, scanning for braces");
    }

    if let Some(obj) = balanced_object_span(text).and_then(parse_object_lenient) {
        tracing::debug!(strategy = "braces", "Located JSON object");
        return Some(obj);
    }

    let obj = naive_object_span(text).and_then(parse_object_lenient);
    if obj.is_some() {
        tracing::debug!(strategy = "brace_depth", "Located JSON object");
    }
    obj
}

/// Parse `candidate` as a JSON object, retrying once with backslash escapes decoded.
fn parse_object_lenient(candidate: &str) -> Option<Map<String, JsonValue>> {
    if let Ok(JsonValue::Object(obj)) = serde_json::from_str::<JsonValue>(candidate) {
        return Some(obj);
    }
    let decoded = unescape_backslashes(candidate);
    if decoded == candidate {
        return None;
    }
    match serde_json::from_str::<JsonValue>(&decoded) {
        Ok(JsonValue::Object(obj)) => {
            tracing::debug!("Parsed JSON after decoding backslash escapes");
            Some(obj)
        }
        _ => None,
    }
}

/// Return the substring from the first `{` to its matching `}`.
///
/// Braces inside JSON string literals are not counted.
pub fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Return the substring from the first `{` to its matching `}`, counting every brace.
///
/// Works on double-escaped text, where `\"` never closes a string literal.
pub fn naive_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode literal backslash escape sequences (`\n`, `\"`, `\\`, `\uXXXX`, `\xHH`, ...).
///
/// Unknown or truncated sequences are kept verbatim. Non-ASCII text passes through.
pub fn unescape_backslashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push('\\');
            break;
        };
        let simple = match next {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'b' => Some('\u{0008}'),
            'f' => Some('\u{000C}'),
            '0' => Some('\0'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '\\' => Some('\\'),
            '/' => Some('/'),
            _ => None,
        };
        if let Some(decoded) = simple {
            chars.next();
            out.push(decoded);
            continue;
        }

        let width = match next {
            'u' => 4,
            'x' => 2,
            _ => {
                out.push('\\');
                continue;
            }
        };
        let digits: String = chars.clone().skip(1).take(width).collect();
        let code = (digits.len() == width)
            .then(|| u32::from_str_radix(&digits, 16).ok())
            .flatten()
            .and_then(char::from_u32);
        match code {
            Some(decoded) => {
                for _ in 0..=width {
                    chars.next();
                }
                out.push(decoded);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(obj: Option<Map<String, JsonValue>>) -> JsonValue {
        obj.map(JsonValue::Object).unwrap_or(JsonValue::Null)
    }

    #[test]
    fn test_markers_with_surrounding_prose() {
        let text = "Sure! Here it is:\n===JSON_START===\n{\"a\": 1, \"b\": [1, 2]}\n===JSON_END===\nEnjoy.";
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"a": 1, "b": [1, 2]})
        );
    }

    #[test]
    fn test_markers_nested_objects() {
        let text = "===JSON_START==={\"outer\": {\"inner\": {\"x\": true}}}===JSON_END===";
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"outer": {"inner": {"x": true}}})
        );
    }

    #[test]
    fn test_fenced_markers() {
        let text = "```json\n===JSON_START===\n{\"k\": \"v\"}\n===JSON_END===\n```";
        assert_eq!(as_value(extract_json_object(text)), json!({"k": "v"}));
    }

    #[test]
    fn test_brace_scan_without_markers() {
        let text = "The plan is {\"days\": 2, \"meta\": {\"ok\": true}} and more {\"ignored\": 1}";
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"days": 2, "meta": {"ok": true}})
        );
    }

    #[test]
    fn test_brace_inside_string_literal() {
        let text = r#"{"note": "use } carefully", "n": 1} trailing"#;
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"note": "use } carefully", "n": 1})
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"q": "say \"{hi}\"", "n": 2}"#;
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"q": "say \"{hi}\"", "n": 2})
        );
    }

    #[test]
    fn test_double_escaped_marker_payload() {
        let text = r#"===JSON_START==={\"city\": \"Paris\", \"days\": 3}===JSON_END==="#;
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"city": "Paris", "days": 3})
        );
    }

    #[test]
    fn test_double_escaped_object_without_markers() {
        let text = r#"Here: {\"city\": \"Paris\", \"days\": 3} done"#;
        assert!(balanced_object_span(text).is_none());
        assert_eq!(
            as_value(extract_json_object(text)),
            json!({"city": "Paris", "days": 3})
        );
    }

    #[test]
    fn test_naive_span_counts_every_brace() {
        assert_eq!(naive_object_span(r#"x {\"a\": {\"b\": 1}} y"#), Some(r#"{\"a\": {\"b\": 1}}"#));
        assert!(naive_object_span("{ open").is_none());
        assert!(naive_object_span("none").is_none());
    }

    #[test]
    fn test_invalid_marker_payload_falls_back_to_braces() {
        // Marker content is malformed; the first balanced region is the same
        // malformed text, so nothing parses.
        let text = "===JSON_START==={not json}===JSON_END===";
        assert!(extract_json_object(text).is_none());
    }

    #[test]
    fn test_no_object_returns_none() {
        assert!(extract_json_object("").is_none());
        assert!(extract_json_object("no braces here").is_none());
        assert!(extract_json_object("{ unbalanced").is_none());
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_balanced_span_multibyte() {
        let text = "préface {\"nom\": \"café\"} fin";
        assert_eq!(balanced_object_span(text), Some("{\"nom\": \"café\"}"));
    }

    #[test]
    fn test_unescape_basic_sequences() {
        assert_eq!(unescape_backslashes(r#"a\nb\t\"c\"\\"#), "a\nb\t\"c\"\\");
        assert_eq!(unescape_backslashes(r"é\x41"), "éA");
    }

    #[test]
    fn test_unescape_keeps_unknown_and_truncated() {
        assert_eq!(unescape_backslashes(r"\q"), r"\q");
        assert_eq!(unescape_backslashes(r"\u12"), r"\u12");
        assert_eq!(unescape_backslashes("end\\"), "end\\");
    }
}
