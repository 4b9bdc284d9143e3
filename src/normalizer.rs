// src/normalizer.rs
//
// Turns whatever text the vision model sends back into an `AnalysisResult`.
// The model is asked for JSON but routinely wraps it in prose or code fences,
// and sometimes ignores the instruction entirely.
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::models::AnalysisResult;

pub const UNKNOWN_FOOD: &str = "Unknown food item";
pub const DEFAULT_EXPLANATION: &str = "Unable to analyze the image properly.";
pub const FALLBACK_EXPLANATION: &str =
    "Unable to analyze the image. Please try again with a clearer image.";
pub const FALLBACK_WARNING: &str =
    "Unable to properly analyze the image. Please try again with a clearer image.";

/// First `{` through the last `}`, across newlines.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

/// Normalizes a raw model completion. Never fails.
pub fn normalize(raw: &str) -> AnalysisResult {
    match extract_object(raw) {
        Some(fields) => from_fields(&fields),
        None => {
            log::warn!("⚠️  Model reply did not contain a parsable JSON object, using fallback");
            fallback(raw)
        }
    }
}

fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    let candidate = JSON_OBJECT.find(raw)?.as_str();
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(_) => None,
        Err(e) => {
            log::debug!("JSON parse of model reply failed: {}", e);
            None
        }
    }
}

fn from_fields(fields: &Map<String, Value>) -> AnalysisResult {
    AnalysisResult {
        food_name: non_blank(fields, "foodName").unwrap_or_else(|| UNKNOWN_FOOD.to_string()),
        is_safe: fields.get("isSafe").and_then(Value::as_bool).unwrap_or(false),
        explanation: non_blank(fields, "explanation")
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        warnings: string_list(fields, "warnings").unwrap_or_default(),
    }
}

fn non_blank(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

// A list with any non-string entry counts as mistyped as a whole.
fn string_list(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    fields
        .get(key)?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn fallback(raw: &str) -> AnalysisResult {
    let explanation = if raw.is_empty() {
        FALLBACK_EXPLANATION.to_string()
    } else {
        raw.to_string()
    };

    AnalysisResult {
        food_name: UNKNOWN_FOOD.to_string(),
        is_safe: false,
        explanation,
        warnings: vec![FALLBACK_WARNING.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, safe: bool, explanation: &str, warnings: &[&str]) -> AnalysisResult {
        AnalysisResult {
            food_name: name.to_string(),
            is_safe: safe,
            explanation: explanation.to_string(),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn test_complete_object_passes_through() {
        let raw = r#"{"foodName":"Sushi","isSafe":false,"explanation":"Raw fish left out","warnings":["Smells off","Discolored"]}"#;
        assert_eq!(
            normalize(raw),
            result("Sushi", false, "Raw fish left out", &["Smells off", "Discolored"])
        );
    }

    #[test]
    fn test_prose_wrapped_object_missing_warnings() {
        let raw = r#"Sure! {"foodName":"Apple","isSafe":true,"explanation":"Looks fresh"}"#;
        assert_eq!(normalize(raw), result("Apple", true, "Looks fresh", &[]));
    }

    #[test]
    fn test_code_fenced_multiline_object() {
        let raw = "Here is the analysis:\n```json\n{\n  \"foodName\": \"Bread\",\n  \"isSafe\": true,\n  \"explanation\": \"No visible mold\",\n  \"warnings\": []\n}\n```\nLet me know!";
        assert_eq!(normalize(raw), result("Bread", true, "No visible mold", &[]));
    }

    #[test]
    fn test_mistyped_fields_get_defaults() {
        let raw = r#"{"foodName":42,"isSafe":"yes","explanation":"Fine","warnings":"none"}"#;
        assert_eq!(normalize(raw), result(UNKNOWN_FOOD, false, "Fine", &[]));
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let raw = r#"{"foodName":"  ","isSafe":true,"explanation":"","warnings":["Check date"]}"#;
        assert_eq!(
            normalize(raw),
            result(UNKNOWN_FOOD, true, DEFAULT_EXPLANATION, &["Check date"])
        );
    }

    #[test]
    fn test_mixed_warning_list_is_dropped() {
        let raw = r#"{"foodName":"Egg","isSafe":true,"explanation":"Boiled","warnings":["ok",1]}"#;
        assert_eq!(normalize(raw), result("Egg", true, "Boiled", &[]));
    }

    #[test]
    fn test_empty_object_is_all_defaults() {
        assert_eq!(
            normalize("{}"),
            result(UNKNOWN_FOOD, false, DEFAULT_EXPLANATION, &[])
        );
    }

    #[test]
    fn test_text_without_braces_falls_back() {
        let raw = "I think this is bread but I'm not sure";
        assert_eq!(
            normalize(raw),
            result(UNKNOWN_FOOD, false, raw, &[FALLBACK_WARNING])
        );
    }

    #[test]
    fn test_empty_reply_falls_back_to_canned_message() {
        assert_eq!(
            normalize(""),
            result(UNKNOWN_FOOD, false, FALLBACK_EXPLANATION, &[FALLBACK_WARNING])
        );
    }

    #[test]
    fn test_fallback_keeps_raw_reply_verbatim() {
        assert_eq!(
            normalize("  I think this is bread\n").explanation,
            "  I think this is bread\n"
        );
        assert_eq!(normalize(" \n ").explanation, " \n ");
        assert_eq!(normalize(" \n ").warnings, vec![FALLBACK_WARNING.to_string()]);
    }

    #[test]
    fn test_malformed_object_falls_back_with_raw_text() {
        let raw = r#"{"foodName": "Pizza", "isSafe": tru"#;
        let normalized = normalize(raw);
        assert_eq!(normalized.explanation, raw);
        assert_eq!(normalized.warnings, vec![FALLBACK_WARNING.to_string()]);
        assert!(!normalized.is_safe);
    }

    #[test]
    fn test_greedy_span_over_two_objects_is_unparsable() {
        let raw = r#"{"foodName":"A"} and also {"foodName":"B"}"#;
        assert_eq!(normalize(raw).food_name, UNKNOWN_FOOD);
        assert_eq!(normalize(raw).warnings.len(), 1);
    }

    #[test]
    fn test_reversed_braces_fall_back() {
        let normalized = normalize("} nothing here {");
        assert_eq!(normalized.explanation, "} nothing here {");
        assert_eq!(normalized.warnings, vec![FALLBACK_WARNING.to_string()]);
    }
}
