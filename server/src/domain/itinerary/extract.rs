//! Locate the natural-language payload inside a generation API response
//!
//! Response shapes differ across API versions and providers, so extraction is
//! an ordered list of candidate extractors combined with first-success
//! semantics. Every candidate is independently guarded: a missing key or an
//! out-of-range index only makes that candidate yield `None`.

use serde_json::Value as JsonValue;

/// One step in a field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

use PathSegment::{Index, Key};

/// Known text locations, most specific first.
pub const RESPONSE_TEXT_PATHS: &[&[PathSegment]] = &[
    &[Key("candidates"), Index(0), Key("content"), Key("parts"), Index(0), Key("text")],
    &[Key("candidates"), Index(0), Key("content"), Index(0), Key("text")],
    &[Key("candidates"), Index(0), Key("text")],
    &[Key("outputs"), Index(0), Key("content"), Index(0), Key("text")],
    &[Key("outputs"), Index(0), Key("text")],
    &[Key("response"), Key("text")],
    &[Key("text")],
];

/// Top-level string fields some providers use for the whole answer.
const TOP_LEVEL_TEXT_KEYS: &[&str] = &["output", "result"];

/// Resolve a path against `value`, returning the node it points at.
pub fn resolve_path<'a>(value: &'a JsonValue, path: &[PathSegment]) -> Option<&'a JsonValue> {
    path.iter().try_fold(value, |cur, segment| match (segment, cur) {
        (Key(key), JsonValue::Object(map)) => map.get(*key),
        (Index(i), JsonValue::Array(items)) => items.get(*i),
        _ => None,
    })
}

/// Resolve a path to a non-blank string.
fn text_at(value: &JsonValue, path: &[PathSegment]) -> Option<String> {
    resolve_path(value, path)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// A pure candidate extractor.
pub type Extractor<T, R> = fn(&T) -> Option<R>;

/// Apply candidates in order and return the first `Some`.
pub fn first_success<T: ?Sized, R>(input: &T, candidates: &[Extractor<T, R>]) -> Option<R> {
    candidates.iter().find_map(|candidate| candidate(input))
}

/// Candidates tried against a response body, in order.
const TEXT_EXTRACTORS: &[Extractor<JsonValue, String>] =
    &[path_text, joined_candidate_parts, top_level_text];

fn path_text(value: &JsonValue) -> Option<String> {
    RESPONSE_TEXT_PATHS.iter().find_map(|path| text_at(value, path))
}

/// Concatenate every text part of every candidate / output entry.
fn joined_candidate_parts(value: &JsonValue) -> Option<String> {
    let entries = value
        .get("candidates")
        .or_else(|| value.get("outputs"))
        .and_then(JsonValue::as_array)?;

    let mut out = String::new();
    for entry in entries {
        match entry {
            JsonValue::String(s) => out.push_str(s),
            JsonValue::Object(map) => {
                let content = map.get("content").or_else(|| map.get("output"));
                let items = match content {
                    Some(JsonValue::Array(items)) => Some(items),
                    Some(JsonValue::Object(inner)) => {
                        inner.get("parts").and_then(JsonValue::as_array)
                    }
                    _ => None,
                };
                let before = out.len();
                for item in items.into_iter().flatten() {
                    match item {
                        JsonValue::String(s) => out.push_str(s),
                        JsonValue::Object(part) => {
                            if let Some(text) = part.get("text").and_then(JsonValue::as_str) {
                                out.push_str(text);
                            }
                        }
                        _ => {}
                    }
                }
                if out.len() == before
                    && let Some(text) = map.get("text").and_then(JsonValue::as_str)
                {
                    out.push_str(text);
                }
            }
            _ => {}
        }
    }
    (!out.trim().is_empty()).then_some(out)
}

fn top_level_text(value: &JsonValue) -> Option<String> {
    TOP_LEVEL_TEXT_KEYS.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

/// True for the values a response check treats as "nothing there".
fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

/// Extract the model's text from a parsed response body.
///
/// Returns `None` only for an empty body. When no known location holds text,
/// the whole body is returned as pretty-printed JSON so downstream extraction
/// can still look for an embedded object.
pub fn extract_response_text(body: &JsonValue) -> Option<String> {
    if is_empty_value(body) {
        return None;
    }
    if let JsonValue::String(s) = body {
        return Some(s.clone());
    }

    if let Some(text) = first_success(body, TEXT_EXTRACTORS) {
        return Some(text);
    }

    tracing::debug!("No known text field in response, using serialized body");
    Some(serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_parts_shape() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "hello"}]}}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("hello"));
    }

    #[test]
    fn test_content_list_shape() {
        let body = json!({"candidates": [{"content": [{"text": "listed"}]}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("listed"));
    }

    #[test]
    fn test_candidate_text_shape() {
        let body = json!({"candidates": [{"text": "flat"}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("flat"));
    }

    #[test]
    fn test_outputs_shapes() {
        let body = json!({"outputs": [{"content": [{"text": "out content"}]}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("out content"));
        let body = json!({"outputs": [{"text": "out text"}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("out text"));
    }

    #[test]
    fn test_response_and_top_level_text() {
        let body = json!({"response": {"text": "nested"}});
        assert_eq!(extract_response_text(&body).as_deref(), Some("nested"));
        let body = json!({"text": "top"});
        assert_eq!(extract_response_text(&body).as_deref(), Some("top"));
    }

    #[test]
    fn test_blank_text_skipped_for_later_path() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}], "text": "fallback"});
        assert_eq!(extract_response_text(&body).as_deref(), Some("fallback"));
    }

    #[test]
    fn test_wrong_types_do_not_panic() {
        let body = json!({"candidates": {"0": "not a list"}, "response": "plain", "text": 5});
        let text = extract_response_text(&body).unwrap();
        assert!(text.contains("\"candidates\""));
    }

    #[test]
    fn test_multiple_parts_joined() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": ""}, {"text": "a"}, {"text": "b"}]}}]});
        assert_eq!(extract_response_text(&body).as_deref(), Some("ab"));
    }

    #[test]
    fn test_output_key_fallback() {
        let body = json!({"output": "from output"});
        assert_eq!(extract_response_text(&body).as_deref(), Some("from output"));
    }

    #[test]
    fn test_unknown_shape_serialized() {
        let body = json!({"weird": {"shape": [1, 2]}});
        let text = extract_response_text(&body).unwrap();
        assert_eq!(serde_json::from_str::<JsonValue>(&text).unwrap(), body);
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_empty_and_string_bodies() {
        assert_eq!(extract_response_text(&JsonValue::Null), None);
        assert_eq!(extract_response_text(&json!({})), None);
        assert_eq!(extract_response_text(&json!([])), None);
        assert_eq!(extract_response_text(&json!("raw text")).as_deref(), Some("raw text"));
    }

    #[test]
    fn test_resolve_path_index_on_object_is_none() {
        let body = json!({"candidates": {"a": 1}});
        assert!(resolve_path(&body, &[Key("candidates"), Index(0)]).is_none());
    }

    fn never(_: &i32) -> Option<&'static str> {
        None
    }

    fn first(_: &i32) -> Option<&'static str> {
        Some("first")
    }

    fn second(_: &i32) -> Option<&'static str> {
        Some("second")
    }

    #[test]
    fn test_first_success_order() {
        let candidates: [Extractor<i32, &'static str>; 3] = [never, first, second];
        assert_eq!(first_success(&1, &candidates), Some("first"));
        let only_never: [Extractor<i32, &'static str>; 1] = [never];
        assert_eq!(first_success(&1, &only_never), None);
    }
}
