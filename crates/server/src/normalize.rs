//! Coerces model output into the response shape clients rely on.

use serde_json::{json, Map, Value};
use shared::domain::Suggestion;

const TITLE_CHARS: usize = 40;

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn normalize_suggestions(suggestions: &Value) -> Vec<Suggestion> {
    let Some(items) = suggestions.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let default_id = format!("S{}", i + 1);
            match item {
                Value::String(text) => Suggestion {
                    id: default_id,
                    title: text.chars().take(TITLE_CHARS).collect(),
                    detail: text.clone(),
                },
                Value::Object(obj) => Suggestion {
                    id: string_field(obj, "id").unwrap_or(default_id),
                    title: string_field(obj, "title")
                        .or_else(|| string_field(obj, "description"))
                        .unwrap_or_else(|| "Suggestion".to_string()),
                    detail: string_field(obj, "detail")
                        .or_else(|| string_field(obj, "description"))
                        .unwrap_or_default(),
                },
                other => Suggestion {
                    id: default_id,
                    title: "Suggestion".to_string(),
                    detail: other.to_string(),
                },
            }
        })
        .collect()
}

pub fn normalize_metrics(metrics: &Value, language: &Value, code: &str) -> Value {
    let empty = Map::new();
    let metrics = metrics.as_object().unwrap_or(&empty);
    let loc = code.matches('\n').count() + 1;
    let pick = |key: &str, default: Value| metrics.get(key).cloned().unwrap_or(default);

    json!({
        "language": language,
        "loc_before": pick("Lines of Code Before", json!(loc)),
        "loc_after": pick("Lines of Code After", json!(loc)),
        "reduction": pick("Lines of Code Reduced", json!(0)),
        "redundant_removed": pick("Redundant Variables Removed", Value::Null),
        "security_improved": pick("String Input Security Improved", json!(false)),
    })
}
