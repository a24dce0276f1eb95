//! Host-side controller of the optimization workflow.
//!
//! The controller is the only component that touches the document and the optimization
//! service. Every inbound [`SurfaceMessage`] produces one or more [`ControllerMessage`]s
//! (or a user notification); failures are reported, never propagated.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::OptimizationRequest,
    error::WorkflowError,
    protocol::{ControllerMessage, SurfaceMessage},
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub mod document;
pub mod optimizer;

pub use document::{DocumentProvider, FileDocumentProvider, NoDocumentProvider};
pub use optimizer::OptimizerClient;

pub const SENDING_STATUS: &str = "Sending to backend...";
pub const APPLY_SUCCESS_NOTICE: &str = "Optimized code applied to the active document.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// User-visible notifications that bypass the surface channel.
pub trait UserNotifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(text) => info!(notice = %text, "user notice"),
            Notice::Error(text) => error!(notice = %text, "user notice"),
        }
    }
}

#[derive(Clone)]
pub struct Controller {
    documents: Arc<dyn DocumentProvider>,
    notifier: Arc<dyn UserNotifier>,
    optimizer: OptimizerClient,
    ui_tx: Sender<ControllerMessage>,
}

impl Controller {
    pub fn new(
        documents: Arc<dyn DocumentProvider>,
        notifier: Arc<dyn UserNotifier>,
        ui_tx: Sender<ControllerMessage>,
    ) -> Self {
        Self::with_optimizer(documents, notifier, OptimizerClient::new(), ui_tx)
    }

    pub fn with_optimizer(
        documents: Arc<dyn DocumentProvider>,
        notifier: Arc<dyn UserNotifier>,
        optimizer: OptimizerClient,
        ui_tx: Sender<ControllerMessage>,
    ) -> Self {
        Self {
            documents,
            notifier,
            optimizer,
            ui_tx,
        }
    }

    /// Handles one surface message. Optimize returns as soon as its request is in flight;
    /// the returned handle resolves once the reply has been delivered.
    pub async fn handle(&self, message: SurfaceMessage) -> Option<JoinHandle<()>> {
        debug!(message = message.kind(), "dispatching surface message");
        match message {
            SurfaceMessage::RequestCurrentCode => {
                self.on_request_current_code().await;
                None
            }
            SurfaceMessage::Optimize { code, backend_url } => {
                Some(self.on_optimize(code, &backend_url))
            }
            SurfaceMessage::ApplyOptimized { optimized } => {
                self.on_apply_optimized(&optimized).await;
                None
            }
        }
    }

    pub async fn on_request_current_code(&self) {
        match self.documents.active_document().await {
            Some(snapshot) => self.emit(ControllerMessage::CurrentCode {
                language_id: snapshot.language_tag,
                text: snapshot.text,
                file_name: snapshot.source_identifier,
            }),
            None => self.emit(ControllerMessage::NoEditor),
        }
    }

    /// Emits the sending status, then runs the request on its own task. Overlapping calls
    /// are independent; nothing is queued or cancelled.
    pub fn on_optimize(&self, code: String, backend_url: &str) -> JoinHandle<()> {
        self.emit(ControllerMessage::status(SENDING_STATUS));

        let request = OptimizationRequest::new(code, backend_url);
        let controller = self.clone();
        tokio::spawn(async move {
            let reply = match controller.optimizer.optimize(&request).await {
                Ok(data) => ControllerMessage::Result { data },
                Err(err) => {
                    warn!(endpoint = %request.endpoint, %err, "optimization request failed");
                    ControllerMessage::error(err.to_string())
                }
            };
            controller.emit(reply);
        })
    }

    pub async fn on_apply_optimized(&self, optimized: &str) {
        let Some(snapshot) = self.documents.active_document().await else {
            self.notifier.notify(Notice::Error(format!(
                "{}: nothing to apply the optimized code to.",
                WorkflowError::NoActiveDocument
            )));
            return;
        };

        match self.documents.replace_all(&snapshot, optimized).await {
            Ok(()) => {
                info!(document = %snapshot.source_identifier, "applied optimized code");
                self.notifier
                    .notify(Notice::Info(APPLY_SUCCESS_NOTICE.to_string()));
            }
            Err(err) => {
                let err = WorkflowError::DocumentWrite(format!("{err:#}"));
                warn!(document = %snapshot.source_identifier, %err, "apply failed");
                self.notifier.notify(Notice::Error(err.to_string()));
            }
        }
    }

    fn emit(&self, message: ControllerMessage) {
        let kind = message.kind();
        if let Err(err) = self.ui_tx.try_send(message) {
            warn!(message = kind, %err, "failed to deliver controller message to surface");
        }
    }
}

/// Runs the controller on a dedicated worker thread with its own tokio runtime until the
/// surface drops its sender.
pub fn start_controller_bridge(
    controller: Controller,
    cmd_rx: Receiver<SurfaceMessage>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                controller.emit(ControllerMessage::error(format!(
                    "controller startup failure: failed to build runtime: {err}"
                )));
                error!("failed to build controller runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut in_flight = Vec::new();
            while let Ok(message) = cmd_rx.recv() {
                if let Some(task) = controller.handle(message).await {
                    in_flight.push(task);
                }
                in_flight.retain(|task: &JoinHandle<()>| !task.is_finished());
            }
            for task in in_flight {
                if let Err(err) = task.await {
                    warn!(%err, "optimization task did not complete");
                }
            }
            debug!("surface disconnected; controller bridge stopped");
        });
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
