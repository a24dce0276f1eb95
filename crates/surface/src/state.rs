//! Surface session state and its transition function.
//!
//! [`SurfaceState`] is never mutated in place: [`SurfaceState::reduce`] builds the next
//! record and reports at most one message for the controller.

use shared::{domain::OptimizationResult, protocol::ControllerMessage, protocol::SurfaceMessage};

use crate::{
    diff::{line_diff, render_diff, DiffLine},
    events::{SurfaceEvent, UserAction},
    render::render_result,
};

pub const INITIAL_STATUS: &str = "Idle";
pub const NO_EDITOR_STATUS: &str =
    "No active editor. Open a C source file in the editor, then press Reload.";
pub const WORKING_STATUS: &str = "Working...";
pub const ERROR_STATUS: &str = "Error";
pub const DONE_STATUS: &str = "Done";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub file_name: String,
    pub language_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    buffer: String,
    backend_url: String,
    status: String,
    log: Vec<String>,
    source: Option<SourceInfo>,
    last_result: Option<OptimizationResult>,
    optimized_output: String,
    metrics_report: String,
    diff: Vec<DiffLine>,
    apply_enabled: bool,
}

/// Next state plus the message, if any, to queue for the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SurfaceState,
    pub outbound: Option<SurfaceMessage>,
}

impl Transition {
    fn quiet(state: SurfaceState) -> Self {
        Self {
            state,
            outbound: None,
        }
    }

    fn send(state: SurfaceState, message: SurfaceMessage) -> Self {
        Self {
            state,
            outbound: Some(message),
        }
    }
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            backend_url: String::new(),
            status: INITIAL_STATUS.to_string(),
            log: Vec::new(),
            source: None,
            last_result: None,
            optimized_output: String::new(),
            metrics_report: String::new(),
            diff: Vec::new(),
            apply_enabled: false,
        }
    }
}

impl SurfaceState {
    /// Fresh surface; asks the controller for the current document right away.
    pub fn open() -> Transition {
        Transition::send(Self::default(), SurfaceMessage::RequestCurrentCode)
    }

    pub fn reduce(&self, event: SurfaceEvent) -> Transition {
        match event {
            SurfaceEvent::User(action) => self.on_user_action(action),
            SurfaceEvent::Controller(message) => Transition::quiet(self.on_controller(message)),
            SurfaceEvent::QueueFailure(reason) => {
                let mut next = self.clone();
                next.log.push(format!("ERROR: {reason}"));
                next.status = reason;
                Transition::quiet(next)
            }
        }
    }

    fn on_user_action(&self, action: UserAction) -> Transition {
        let mut next = self.clone();
        match action {
            UserAction::EditBuffer(text) => {
                next.buffer = text;
                Transition::quiet(next)
            }
            UserAction::EditBackendUrl(url) => {
                next.backend_url = url;
                Transition::quiet(next)
            }
            UserAction::EditOptimizedOutput(text) => {
                next.optimized_output = text;
                Transition::quiet(next)
            }
            UserAction::Reload => {
                next.apply_enabled = false;
                Transition::send(next, SurfaceMessage::RequestCurrentCode)
            }
            UserAction::Optimize => {
                next.apply_enabled = false;
                next.status = WORKING_STATUS.to_string();
                next.log.push(format!(
                    "Optimize requested ({} bytes)",
                    next.buffer.len()
                ));
                let message = SurfaceMessage::Optimize {
                    code: next.buffer.clone(),
                    backend_url: next.backend_url.clone(),
                };
                Transition::send(next, message)
            }
            UserAction::Apply => {
                if !self.apply_enabled {
                    tracing::debug!("apply ignored: no rendered optimization result");
                    return Transition::quiet(next);
                }
                let message = SurfaceMessage::ApplyOptimized {
                    optimized: next.optimized_output.clone(),
                };
                Transition::send(next, message)
            }
        }
    }

    fn on_controller(&self, message: ControllerMessage) -> SurfaceState {
        let mut next = self.clone();
        match message {
            ControllerMessage::NoEditor => {
                next.status = NO_EDITOR_STATUS.to_string();
            }
            ControllerMessage::CurrentCode {
                language_id,
                text,
                file_name,
            } => {
                next.buffer = text;
                next.source = Some(SourceInfo {
                    file_name,
                    language_id,
                });
            }
            ControllerMessage::Status { text } => {
                next.log.push(text.clone());
                next.status = text;
            }
            ControllerMessage::Error { text } => {
                next.status = ERROR_STATUS.to_string();
                next.log.push(format!("ERROR: {text}"));
            }
            ControllerMessage::Result { data } => {
                let rendered = render_result(&data);
                next.status = DONE_STATUS.to_string();
                next.diff = line_diff(&next.buffer, &rendered.optimized_output);
                next.optimized_output = rendered.optimized_output;
                next.metrics_report = rendered.metrics_report;
                next.last_result = Some(rendered.result);
                next.apply_enabled = true;
            }
        }
        next
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    pub fn last_result(&self) -> Option<&OptimizationResult> {
        self.last_result.as_ref()
    }

    pub fn optimized_output(&self) -> &str {
        &self.optimized_output
    }

    pub fn metrics_report(&self) -> &str {
        &self.metrics_report
    }

    pub fn diff(&self) -> &[DiffLine] {
        &self.diff
    }

    pub fn rendered_diff(&self) -> String {
        render_diff(&self.diff)
    }

    pub fn apply_enabled(&self) -> bool {
        self.apply_enabled
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
