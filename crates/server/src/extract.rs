//! Pulls the first JSON object out of free-form model output.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("No JSON detected in LLM response")]
    NoJson,
    #[error("Could not match complete JSON")]
    Unterminated,
    #[error("invalid JSON object: {0}")]
    Parse(String),
    #[error("LLM response JSON is not an object")]
    NotObject,
}

fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = text.trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Braces are counted without regard to string literals, so a `}` inside a string value
/// can end the object early; the parse error is reported in that case.
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ExtractError> {
    let text = strip_fences(raw);
    let Some(start) = text.find('{') else {
        tracing::warn!(raw = %text, "no JSON object in model output");
        return Err(ExtractError::NoJson);
    };

    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..=start + offset];
                    let value: Value = serde_json::from_str(candidate).map_err(|err| {
                        tracing::warn!(candidate, %err, "failed to parse extracted JSON");
                        ExtractError::Parse(err.to_string())
                    })?;
                    return match value {
                        Value::Object(map) => Ok(map),
                        _ => Err(ExtractError::NotObject),
                    };
                }
            }
            _ => {}
        }
    }

    tracing::warn!(raw = %text, "model output has no complete JSON object");
    Err(ExtractError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_object_is_returned() {
        let map = extract_json(r#"{"optimized_code": "int a;"}"#).expect("extract");
        assert_eq!(map["optimized_code"], json!("int a;"));
    }

    #[test]
    fn fenced_object_is_unwrapped() {
        let raw = "```json\n{\"suggestions\": []}\n```";
        assert_eq!(
            Value::Object(extract_json(raw).expect("extract")),
            json!({"suggestions": []})
        );

        let raw = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(Value::Object(extract_json(raw).expect("extract")), json!({"a": 1}));
    }

    #[test]
    fn surrounding_noise_is_ignored() {
        let raw = "Sure! Here you go: {\"a\": {\"b\": 2}} hope that helps {\"c\": 3}";
        assert_eq!(
            Value::Object(extract_json(raw).expect("extract")),
            json!({"a": {"b": 2}})
        );
    }

    #[test]
    fn missing_object_is_reported() {
        assert_eq!(extract_json("no json here"), Err(ExtractError::NoJson));
    }

    #[test]
    fn unterminated_object_is_reported() {
        assert_eq!(extract_json("{\"a\": {\"b\": 1}"), Err(ExtractError::Unterminated));
    }

    #[test]
    fn brace_inside_string_breaks_the_match() {
        let err = extract_json(r#"{"code": "int main() }", "x": 1}"#).expect_err("must fail");
        assert!(matches!(err, ExtractError::Parse(_)));
    }
}
