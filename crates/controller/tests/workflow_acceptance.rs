use std::{sync::Arc, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use controller::{Controller, DocumentProvider, FileDocumentProvider, Notice, UserNotifier};
use crossbeam_channel::{unbounded, Receiver};
use serde_json::{json, Value};
use shared::protocol::{ControllerMessage, SurfaceMessage};
use surface::{state::ERROR_STATUS, SurfaceDriver, UserAction};
use tokio::net::TcpListener;

struct QuietNotifier;

impl UserNotifier for QuietNotifier {
    fn notify(&self, _notice: Notice) {}
}

async fn optimize_handler(Json(payload): Json<Value>) -> Response {
    let code = payload["code"].as_str().unwrap_or_default().to_string();
    if code.contains("oom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "oom").into_response();
    }
    if code.contains("slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    (
        StatusCode::OK,
        Json(json!({
            "optimized_code": format!("/* optimized */\n{code}"),
            "suggestions": [],
            "metrics": {},
        })),
    )
        .into_response()
}

async fn spawn_backend() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/optimize", post(optimize_handler));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/optimize")
}

/// Feeds every queued surface message through the controller, awaiting network replies.
async fn run_controller(controller: &Controller, cmd_rx: &Receiver<SurfaceMessage>) {
    let mut tasks = Vec::new();
    while let Ok(message) = cmd_rx.try_recv() {
        if let Some(task) = controller.handle(message).await {
            tasks.push(task);
        }
    }
    for task in tasks {
        task.await.expect("optimize task");
    }
}

#[tokio::test]
async fn optimize_and_apply_round_trip_through_file() {
    let endpoint = spawn_backend().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("main.c");
    std::fs::write(&path, "int a;").expect("seed");

    let documents = Arc::new(FileDocumentProvider::new(&path, "c"));
    let (ui_tx, ui_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded();
    let controller = Controller::new(documents.clone(), Arc::new(QuietNotifier), ui_tx);

    let mut surface = SurfaceDriver::open(cmd_tx);
    run_controller(&controller, &cmd_rx).await;
    surface.pump(&ui_rx);
    assert_eq!(surface.state().buffer(), "int a;");

    surface.handle(UserAction::EditBackendUrl(endpoint));
    surface.handle(UserAction::Optimize);
    run_controller(&controller, &cmd_rx).await;
    surface.pump(&ui_rx);

    assert_eq!(surface.state().status(), "Done");
    assert_eq!(surface.state().optimized_output(), "/* optimized */\nint a;");
    assert_eq!(
        surface.state().rendered_diff(),
        "- int a;\n+ /* optimized */\n+ int a;"
    );

    surface.handle(UserAction::Apply);
    run_controller(&controller, &cmd_rx).await;
    let snapshot = documents.active_document().await.expect("document");
    assert_eq!(snapshot.text, "/* optimized */\nint a;");
}

#[tokio::test]
async fn backend_failure_leaves_apply_disabled() {
    let endpoint = spawn_backend().await;
    let (ui_tx, ui_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded();
    let controller = Controller::new(
        Arc::new(controller::NoDocumentProvider),
        Arc::new(QuietNotifier),
        ui_tx,
    );

    let mut surface = SurfaceDriver::open(cmd_tx);
    surface.handle(UserAction::EditBuffer("oom".to_string()));
    surface.handle(UserAction::EditBackendUrl(endpoint));
    surface.handle(UserAction::Optimize);
    run_controller(&controller, &cmd_rx).await;
    surface.pump(&ui_rx);

    let state = surface.state();
    assert_eq!(state.status(), ERROR_STATUS);
    assert!(state
        .log()
        .iter()
        .any(|line| line == "ERROR: Backend error: 500 oom"));
    assert!(!state.apply_enabled());
    // Missing document was reported on open and the typed buffer survived it.
    assert_eq!(state.buffer(), "oom");
}

#[tokio::test]
async fn slower_stale_reply_overwrites_newer_result() {
    let endpoint = spawn_backend().await;
    let (ui_tx, ui_rx) = unbounded();
    let (cmd_tx, cmd_rx) = unbounded();
    let controller = Controller::new(
        Arc::new(controller::NoDocumentProvider),
        Arc::new(QuietNotifier),
        ui_tx,
    );

    let mut surface = SurfaceDriver::open(cmd_tx);
    surface.handle(UserAction::EditBackendUrl(endpoint));
    surface.handle(UserAction::EditBuffer("slow".to_string()));
    surface.handle(UserAction::Optimize);
    surface.handle(UserAction::EditBuffer("fast".to_string()));
    surface.handle(UserAction::Optimize);
    run_controller(&controller, &cmd_rx).await;

    let order: Vec<String> = ui_rx
        .try_iter()
        .map(|message| {
            if let ControllerMessage::Result { data } = &message {
                let code = data["optimized_code"].as_str().unwrap_or_default().to_string();
                surface.handle(message);
                code
            } else {
                let kind = message.kind().to_string();
                surface.handle(message);
                kind
            }
        })
        .collect();

    assert_eq!(
        order.iter().filter(|entry| entry.contains("optimized")).cloned().collect::<Vec<_>>(),
        vec![
            "/* optimized */\nfast".to_string(),
            "/* optimized */\nslow".to_string()
        ]
    );
    assert_eq!(surface.state().optimized_output(), "/* optimized */\nslow");
    assert!(surface.state().apply_enabled());
}
