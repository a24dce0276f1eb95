//! HTTP client for the optimization service.

use reqwest::Client;
use serde_json::Value;
use shared::{domain::OptimizationRequest, error::WorkflowError};
use url::Url;

#[derive(Clone, Default)]
pub struct OptimizerClient {
    http: Client,
}

impl OptimizerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http(http: Client) -> Self {
        Self { http }
    }

    /// Posts one request and returns the reply body untouched. Exactly one attempt.
    pub async fn optimize(&self, request: &OptimizationRequest) -> Result<Value, WorkflowError> {
        let endpoint = Url::parse(&request.endpoint).map_err(|err| {
            WorkflowError::Transport(format!("invalid backend URL '{}': {err}", request.endpoint))
        })?;

        let res = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| WorkflowError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .map_err(|err| WorkflowError::Transport(err.to_string()))?;
            return Err(WorkflowError::BackendHttp {
                status: status.as_u16(),
                body,
            });
        }

        res.json::<Value>()
            .await
            .map_err(|err| WorkflowError::Transport(err.to_string()))
    }
}
