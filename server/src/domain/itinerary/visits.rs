//! Visit-sequence normalization
//!
//! `visit_sequence` arrives in whatever shape the model felt like producing:
//! a list of objects, a JSON-encoded string, a wrapper object, a list of
//! strings, or a mix. Everything is coerced into a flat list of objects;
//! entries that cannot be recovered are dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value as JsonValue, json};

use super::locate::extract_json_object;
use super::types::JsonMap;

static ORDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)order\s*[:=]\s*(\d+)").expect("order regex is valid"));

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)location_name\s*[:=]\s*["']?([^,"']+)["']?"#)
        .expect("location regex is valid")
});

/// Parse a string as JSON, falling back to the embedded-object locator.
fn parse_embedded(text: &str) -> Option<JsonValue> {
    serde_json::from_str::<JsonValue>(text)
        .ok()
        .or_else(|| extract_json_object(text).map(JsonValue::Object))
}

/// Coerce the raw `visit_sequence` value into a list of visit records.
pub fn normalize_visit_sequence(raw: &JsonValue) -> Vec<JsonMap> {
    let unwrapped;
    let mut seq = raw;

    if let JsonValue::String(text) = seq {
        if text.is_empty() {
            return Vec::new();
        }
        unwrapped = match serde_json::from_str::<JsonValue>(text) {
            Ok(parsed) => parsed,
            Err(_) => match extract_json_object(text) {
                Some(obj) => obj.get("visit_sequence").cloned().unwrap_or(JsonValue::Null),
                None => JsonValue::Null,
            },
        };
        seq = &unwrapped;
    }

    if let JsonValue::Object(map) = seq {
        seq = non_empty(map.get("visit_sequence"))
            .or_else(|| non_empty(map.get("visits")))
            .unwrap_or(&JsonValue::Null);
    }

    let JsonValue::Array(items) = seq else {
        return Vec::new();
    };

    let mut normalized = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Object(map) => normalized.push(map.clone()),
            JsonValue::Array(nested) => normalized.extend(objects_in(nested)),
            JsonValue::String(text) => match parse_embedded(text) {
                Some(JsonValue::Object(map)) => normalized.push(map),
                Some(JsonValue::Array(nested)) => normalized.extend(objects_in(&nested)),
                _ => {
                    if let Some(partial) = recover_partial_visit(text) {
                        normalized.push(partial);
                    } else {
                        tracing::debug!(entry = %text, "Dropping unrecoverable visit entry");
                    }
                }
            },
            other => tracing::debug!(entry = %other, "Dropping non-object visit entry"),
        }
    }
    normalized
}

fn non_empty(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| match v {
        JsonValue::Null => false,
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
        JsonValue::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn objects_in(items: &[JsonValue]) -> impl Iterator<Item = JsonMap> + '_ {
    items.iter().filter_map(|v| v.as_object().cloned())
}

/// Best-effort `order` / `location_name` recovery from an unparsable string.
pub fn recover_partial_visit(text: &str) -> Option<JsonMap> {
    let mut partial = Map::new();
    if let Some(order) = ORDER_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    {
        partial.insert("order".to_string(), json!(order));
    }
    if let Some(name) = LOCATION_RE.captures(text).and_then(|c| c.get(1)) {
        let name = name.as_str().trim();
        if !name.is_empty() {
            partial.insert("location_name".to_string(), json!(name));
        }
    }
    (!partial.is_empty()).then_some(partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_values(records: Vec<JsonMap>) -> Vec<JsonValue> {
        records.into_iter().map(JsonValue::Object).collect()
    }

    fn direct() -> JsonValue {
        json!([
            {"order": 1, "location_name": "Louvre"},
            {"order": 2, "location_name": "Eiffel Tower"}
        ])
    }

    #[test]
    fn test_empty_inputs() {
        assert!(normalize_visit_sequence(&JsonValue::Null).is_empty());
        assert!(normalize_visit_sequence(&json!("")).is_empty());
        assert!(normalize_visit_sequence(&json!([])).is_empty());
        assert!(normalize_visit_sequence(&json!({})).is_empty());
        assert!(normalize_visit_sequence(&json!(42)).is_empty());
    }

    #[test]
    fn test_native_list() {
        let expected = direct().as_array().unwrap().clone();
        assert_eq!(as_values(normalize_visit_sequence(&direct())), expected);
    }

    #[test]
    fn test_json_encoded_string_matches_direct() {
        let encoded = JsonValue::String(direct().to_string());
        assert_eq!(
            as_values(normalize_visit_sequence(&encoded)),
            as_values(normalize_visit_sequence(&direct()))
        );
    }

    #[test]
    fn test_wrapper_mapping_matches_direct() {
        let wrapped = json!({"visit_sequence": direct()});
        assert_eq!(
            as_values(normalize_visit_sequence(&wrapped)),
            as_values(normalize_visit_sequence(&direct()))
        );
        let visits = json!({"visits": direct()});
        assert_eq!(
            as_values(normalize_visit_sequence(&visits)),
            as_values(normalize_visit_sequence(&direct()))
        );
    }

    #[test]
    fn test_string_with_embedded_wrapper() {
        let text = format!("Here you go: {{\"visit_sequence\": {}}} thanks", direct());
        assert_eq!(
            as_values(normalize_visit_sequence(&JsonValue::String(text))),
            as_values(normalize_visit_sequence(&direct()))
        );
    }

    #[test]
    fn test_string_with_embedded_object_without_key() {
        let text = "prose {\"other\": 1} prose".to_string();
        assert!(normalize_visit_sequence(&JsonValue::String(text)).is_empty());
    }

    #[test]
    fn test_nested_lists_flattened_one_level() {
        let raw = json!([
            [{"order": 1, "location_name": "A"}, "skip", 3],
            {"order": 2, "location_name": "B"}
        ]);
        let out = as_values(normalize_visit_sequence(&raw));
        assert_eq!(
            out,
            vec![
                json!({"order": 1, "location_name": "A"}),
                json!({"order": 2, "location_name": "B"})
            ]
        );
    }

    #[test]
    fn test_string_items_parsed() {
        let raw = json!([
            "{\"order\": 1, \"location_name\": \"A\"}",
            "[{\"order\": 2, \"location_name\": \"B\"}, 7]",
            "stop: {\"order\": 3, \"location_name\": \"C\"}"
        ]);
        let names: Vec<_> = normalize_visit_sequence(&raw)
            .into_iter()
            .map(|m| m["location_name"].clone())
            .collect();
        assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);
    }

    #[test]
    fn test_regex_recovery() {
        let raw = json!(["order: 4, location_name: 'Notre Dame'", "ORDER=5"]);
        let out = as_values(normalize_visit_sequence(&raw));
        assert_eq!(
            out,
            vec![
                json!({"order": 4, "location_name": "Notre Dame"}),
                json!({"order": 5})
            ]
        );
    }

    #[test]
    fn test_unrecoverable_entries_dropped() {
        let raw = json!(["just words", null, true, {"location_name": "Kept"}]);
        let out = as_values(normalize_visit_sequence(&raw));
        assert_eq!(out, vec![json!({"location_name": "Kept"})]);
    }

    #[test]
    fn test_recover_partial_visit_none() {
        assert!(recover_partial_visit("nothing useful").is_none());
    }

    #[test]
    fn test_double_escaped_string_item() {
        let raw = json!([r#"{\"order\": 1, \"location_name\": \"Louvre\"}"#]);
        assert_eq!(
            as_values(normalize_visit_sequence(&raw)),
            vec![json!({"order": 1, "location_name": "Louvre"})]
        );
    }
}
