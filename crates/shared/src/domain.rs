use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Endpoint used when the user leaves the backend URL empty.
pub const DEFAULT_OPTIMIZE_ENDPOINT: &str = "http://localhost:8000/optimize";

/// Language sent with every optimization request.
pub const OPTIMIZE_LANGUAGE: &str = "c";

/// Immutable capture of the active document at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub source_identifier: String,
    pub language_tag: String,
    pub text: String,
}

impl DocumentSnapshot {
    pub fn new(
        source_identifier: impl Into<String>,
        language_tag: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_identifier: source_identifier.into(),
            language_tag: language_tag.into(),
            text: text.into(),
        }
    }
}

/// Body posted to the optimization service. The endpoint travels alongside but is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub language: String,
    pub code: String,
    #[serde(skip)]
    pub endpoint: String,
}

impl OptimizationRequest {
    /// An empty (or whitespace-only) override selects [`DEFAULT_OPTIMIZE_ENDPOINT`].
    pub fn new(code: impl Into<String>, endpoint_override: &str) -> Self {
        let endpoint_override = endpoint_override.trim();
        let endpoint = if endpoint_override.is_empty() {
            DEFAULT_OPTIMIZE_ENDPOINT.to_string()
        } else {
            endpoint_override.to_string()
        };

        Self {
            language: OPTIMIZE_LANGUAGE.to_string(),
            code: code.into(),
            endpoint,
        }
    }
}

/// Normalized suggestion entry as produced by the optimization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub detail: String,
}

/// Result of one optimization, validated once at the surface boundary.
///
/// The wire shape is loosely typed: every field may be absent or carry the wrong JSON
/// type. Such fields are replaced with their empty value instead of failing the whole
/// result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    #[serde(default)]
    pub optimized_code: String,
    #[serde(default)]
    pub suggestions: Vec<Value>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

impl OptimizationResult {
    pub fn from_value(data: &Value) -> Self {
        let optimized_code = data
            .get("optimized_code")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let suggestions = data
            .get("suggestions")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let metrics = data
            .get("metrics")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            optimized_code,
            suggestions,
            metrics,
        }
    }

    /// The `{suggestions, metrics}` document shown in the metrics pane.
    pub fn report(&self) -> Value {
        let mut report = Map::new();
        report.insert(
            "suggestions".to_string(),
            Value::Array(self.suggestions.clone()),
        );
        report.insert("metrics".to_string(), Value::Object(self.metrics.clone()));
        Value::Object(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_override_uses_default_endpoint() {
        let req = OptimizationRequest::new("int a;", "");
        assert_eq!(req.endpoint, DEFAULT_OPTIMIZE_ENDPOINT);
        assert_eq!(req.language, "c");

        let req = OptimizationRequest::new("int a;", "  http://10.0.0.2:9000/optimize ");
        assert_eq!(req.endpoint, "http://10.0.0.2:9000/optimize");
    }

    #[test]
    fn request_body_omits_endpoint() {
        let req = OptimizationRequest::new("x();", "http://example.invalid/optimize");
        let body = serde_json::to_value(&req).expect("serialize");
        assert_eq!(body, json!({"language": "c", "code": "x();"}));
    }

    #[test]
    fn missing_result_fields_become_empty() {
        let result = OptimizationResult::from_value(&json!({}));
        assert_eq!(result, OptimizationResult::default());
        assert_eq!(result.report(), json!({"suggestions": [], "metrics": {}}));
    }

    #[test]
    fn wrongly_typed_result_fields_become_empty() {
        let result = OptimizationResult::from_value(&json!({
            "optimized_code": 17,
            "suggestions": "not a list",
            "metrics": ["not", "a", "map"],
        }));
        assert_eq!(result, OptimizationResult::default());

        let result = OptimizationResult::from_value(&json!("just a string"));
        assert_eq!(result, OptimizationResult::default());
    }

    #[test]
    fn suggestions_keep_their_order() {
        let result = OptimizationResult::from_value(&json!({
            "optimized_code": "int a;",
            "suggestions": ["first", {"id": "S2", "title": "second", "detail": ""}],
            "metrics": {"loc_before": 3},
        }));
        assert_eq!(result.optimized_code, "int a;");
        assert_eq!(result.suggestions[0], json!("first"));
        assert_eq!(result.suggestions[1]["title"], json!("second"));
        assert_eq!(result.metrics["loc_before"], json!(3));
    }
}
