//! HTTP surface of the optimization service.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ApiError;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use crate::{
    extract::extract_json,
    llm::CodeModel,
    normalize::{normalize_metrics, normalize_suggestions},
};

pub const CODE_NOT_STRING: &str = "`code` must be a string";

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn CodeModel>,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(ping))
        .route("/optimize", post(optimize))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({"ok": true}))
}

/// Any JSON body is accepted; only `code` is required.
async fn optimize(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let data: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let language = data.get("language").cloned().unwrap_or(Value::Null);
    let Some(code) = data.get("code").and_then(Value::as_str) else {
        return Err(bad_request(CODE_NOT_STRING));
    };

    let language_name = language.as_str().unwrap_or("unspecified");
    info!(language = language_name, bytes = code.len(), "optimization requested");

    let raw = state
        .model
        .generate(language_name, code)
        .await
        .map_err(|err| llm_failure(err.to_string()))?;
    let mut parsed = extract_json(&raw).map_err(|err| llm_failure(err.to_string()))?;

    parsed
        .entry("optimized_code")
        .or_insert_with(|| Value::String(code.to_string()));
    let suggestions = parsed.get("suggestions").cloned().unwrap_or(json!([]));
    let metrics = parsed.get("metrics").cloned().unwrap_or(json!({}));

    parsed.insert(
        "suggestions".to_string(),
        serde_json::to_value(normalize_suggestions(&suggestions)).unwrap_or(json!([])),
    );
    parsed.insert(
        "metrics".to_string(),
        normalize_metrics(&metrics, &language, code),
    );

    Ok(Json(Value::Object(parsed)))
}

fn bad_request(message: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(message)))
}

fn llm_failure(cause: String) -> (StatusCode, Json<ApiError>) {
    warn!(%cause, "optimization failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(format!("LLM error: {cause}"))),
    )
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
