use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from the presentation surface to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SurfaceMessage {
    RequestCurrentCode,
    Optimize {
        code: String,
        /// Empty means "use the default endpoint".
        #[serde(default)]
        backend_url: String,
    },
    ApplyOptimized {
        optimized: String,
    },
}

impl SurfaceMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceMessage::RequestCurrentCode => "request_current_code",
            SurfaceMessage::Optimize { .. } => "optimize",
            SurfaceMessage::ApplyOptimized { .. } => "apply_optimized",
        }
    }
}

/// Messages sent from the controller back to the presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ControllerMessage {
    NoEditor,
    CurrentCode {
        language_id: String,
        text: String,
        file_name: String,
    },
    Status {
        text: String,
    },
    Error {
        text: String,
    },
    /// Raw backend reply; shape validation happens on the surface.
    Result {
        data: Value,
    },
}

impl ControllerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerMessage::NoEditor => "no_editor",
            ControllerMessage::CurrentCode { .. } => "current_code",
            ControllerMessage::Status { .. } => "status",
            ControllerMessage::Error { .. } => "error",
            ControllerMessage::Result { .. } => "result",
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        ControllerMessage::Status { text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ControllerMessage::Error { text: text.into() }
    }
}
