use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the optimization service: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Failures of a workflow step. Each one ends up as user-visible text.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No active editor")]
    NoActiveDocument,
    #[error("Backend error: {status} {body}")]
    BackendHttp { status: u16, body: String },
    #[error("{0}")]
    Transport(String),
    #[error("failed to write document: {0}")]
    DocumentWrite(String),
}
