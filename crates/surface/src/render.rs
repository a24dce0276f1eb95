//! Turns a raw backend reply into the text shown in the result panes.

use serde_json::Value;
use shared::domain::OptimizationResult;

pub const NO_OPTIMIZED_CODE_PLACEHOLDER: &str = "(no optimized code returned)";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub result: OptimizationResult,
    pub optimized_output: String,
    pub metrics_report: String,
}

pub fn render_result(data: &Value) -> RenderedResult {
    let result = OptimizationResult::from_value(data);
    let optimized_output = if result.optimized_code.is_empty() {
        NO_OPTIMIZED_CODE_PLACEHOLDER.to_string()
    } else {
        result.optimized_code.clone()
    };
    let metrics_report = serde_json::to_string_pretty(&result.report()).unwrap_or_default();

    RenderedResult {
        result,
        optimized_output,
        metrics_report,
    }
}
