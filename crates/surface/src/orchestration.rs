//! Moves surface transitions onto the controller queue and feeds controller replies back in.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::protocol::{ControllerMessage, SurfaceMessage};

use crate::{events::SurfaceEvent, state::SurfaceState};

pub fn dispatch_surface_message(
    cmd_tx: &Sender<SurfaceMessage>,
    msg: SurfaceMessage,
) -> Result<(), String> {
    let kind = msg.kind();
    match cmd_tx.try_send(msg) {
        Ok(()) => {
            tracing::debug!(message = kind, "queued surface->controller message");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err("Controller queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => {
            Err("Controller disconnected; reopen the optimizer panel".to_string())
        }
    }
}

/// Owns the current [`SurfaceState`] and the outbound half of the channel.
pub struct SurfaceDriver {
    state: SurfaceState,
    cmd_tx: Sender<SurfaceMessage>,
}

impl SurfaceDriver {
    pub fn open(cmd_tx: Sender<SurfaceMessage>) -> Self {
        let opened = SurfaceState::open();
        let mut driver = Self {
            state: opened.state,
            cmd_tx,
        };
        if let Some(msg) = opened.outbound {
            driver.send(msg);
        }
        driver
    }

    pub fn handle(&mut self, event: impl Into<SurfaceEvent>) {
        let transition = self.state.reduce(event.into());
        self.state = transition.state;
        if let Some(msg) = transition.outbound {
            self.send(msg);
        }
    }

    /// Applies every controller message already waiting; returns how many were handled.
    pub fn pump(&mut self, ui_rx: &Receiver<ControllerMessage>) -> usize {
        let mut handled = 0;
        while let Ok(message) = ui_rx.try_recv() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    fn send(&mut self, msg: SurfaceMessage) {
        if let Err(reason) = dispatch_surface_message(&self.cmd_tx, msg) {
            tracing::warn!(%reason, "failed to queue surface message");
            self.state = self.state.reduce(SurfaceEvent::QueueFailure(reason)).state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::UserAction;
    use crossbeam_channel::{bounded, unbounded};

    #[test]
    fn opening_queues_request_for_current_code() {
        let (cmd_tx, cmd_rx) = unbounded();
        let _driver = SurfaceDriver::open(cmd_tx);
        assert_eq!(cmd_rx.try_recv(), Ok(SurfaceMessage::RequestCurrentCode));
    }

    #[test]
    fn full_queue_surfaces_in_status() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut driver = SurfaceDriver::open(cmd_tx);
        driver.handle(UserAction::Optimize);
        assert_eq!(driver.state().status(), "Controller queue is full; please retry");
    }

    #[test]
    fn disconnected_controller_surfaces_in_status() {
        let (cmd_tx, cmd_rx) = unbounded();
        let mut driver = SurfaceDriver::open(cmd_tx);
        drop(cmd_rx);
        driver.handle(UserAction::Reload);
        assert!(driver.state().status().contains("disconnected"));
    }

    #[test]
    fn pump_drains_pending_controller_messages() {
        let (cmd_tx, _cmd_rx) = unbounded();
        let (ui_tx, ui_rx) = unbounded();
        let mut driver = SurfaceDriver::open(cmd_tx);

        ui_tx
            .send(ControllerMessage::CurrentCode {
                language_id: "c".into(),
                text: "int a;".into(),
                file_name: "a.c".into(),
            })
            .expect("send");
        ui_tx
            .send(ControllerMessage::status("Sending to backend..."))
            .expect("send");

        assert_eq!(driver.pump(&ui_rx), 2);
        assert_eq!(driver.state().buffer(), "int a;");
        assert_eq!(driver.state().status(), "Sending to backend...");
        assert_eq!(driver.pump(&ui_rx), 0);
    }
}
