//! Inputs to the surface reducer: user gestures and controller messages.

use shared::protocol::ControllerMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    EditBuffer(String),
    EditBackendUrl(String),
    /// Hand edits to the optimized-output pane; apply writes whatever the pane shows.
    EditOptimizedOutput(String),
    Reload,
    Optimize,
    Apply,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    User(UserAction),
    Controller(ControllerMessage),
    /// The outbound queue refused a message.
    QueueFailure(String),
}

impl From<UserAction> for SurfaceEvent {
    fn from(action: UserAction) -> Self {
        SurfaceEvent::User(action)
    }
}

impl From<ControllerMessage> for SurfaceEvent {
    fn from(message: ControllerMessage) -> Self {
        SurfaceEvent::Controller(message)
    }
}
