//! Model backend used to produce optimizations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SYSTEM_INSTRUCTION: &str = r#"
You MUST reply with ONLY valid JSON.
NO explanations. NO markdown. NO backticks.

Response shape:
{
  "optimized_code": "string",
  "suggestions": [
    {
      "id": "S1",
      "title": "short title",
      "detail": "full explanation"
    }
  ],
  "metrics": {
    "language": "c",
    "loc_before": 0,
    "loc_after": 0,
    "reduction": 0
  }
}
You MUST follow this structure.
"#;

const IMPROVEMENTS: &[&str] = &[
    "dead code removal",
    "better naming",
    "safer input",
    "modularity",
    "readability",
    "remove unused variables",
    "remove duplicate logic",
];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model returned no output")]
    EmptyResponse,
}

#[async_trait]
pub trait CodeModel: Send + Sync {
    /// Returns the raw text the model produced for this code.
    async fn generate(&self, language: &str, code: &str) -> Result<String, LlmError>;
}

pub fn build_prompt(language: &str, code: &str) -> String {
    let improvements: String = IMPROVEMENTS
        .iter()
        .map(|item| format!("- {item}\n"))
        .collect();
    format!(
        "{SYSTEM_INSTRUCTION}\n\nOptimize this code.\n\nImprove:\n{improvements}\nLanguage: {language}\n\nCode:\n{code}\n"
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama `/api/generate` client, non-streaming.
pub struct OllamaModel {
    http: Client,
    url: String,
    model: String,
}

impl OllamaModel {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl CodeModel for OllamaModel {
    async fn generate(&self, language: &str, code: &str) -> Result<String, LlmError> {
        let body: GenerateResponse = self
            .http
            .post(&self.url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt: build_prompt(language, code),
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(model = %self.model, raw = %body.response, "raw model output");
        if body.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(body.response)
    }
}
