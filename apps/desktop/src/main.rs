use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{bail, Result};
use clap::Parser;
use controller::{
    start_controller_bridge, Controller, FileDocumentProvider, Notice, UserNotifier,
};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use shared::protocol::ControllerMessage;
use surface::{
    state::{DONE_STATUS, ERROR_STATUS, NO_EDITOR_STATUS},
    SurfaceDriver, SurfaceState, UserAction,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Send a source file to the optimization service and review the result")]
struct Args {
    /// Source file treated as the active document.
    #[arg(long)]
    file: PathBuf,
    /// Optimization endpoint; empty uses http://localhost:8000/optimize.
    #[arg(long, default_value = "")]
    backend_url: String,
    #[arg(long, default_value = "c")]
    language: String,
    /// Write the optimized code back into the file.
    #[arg(long)]
    apply: bool,
    #[arg(long, default_value_t = 180)]
    timeout_secs: u64,
}

struct StderrNotifier;

impl UserNotifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(text) => {
                tracing::info!(notice = %text, "user notice");
                eprintln!("{text}");
            }
            Notice::Error(text) => {
                tracing::error!(notice = %text, "user notice");
                eprintln!("error: {text}");
            }
        }
    }
}

/// Feeds controller replies into the surface until `done` holds or the deadline passes.
fn wait_for(
    driver: &mut SurfaceDriver,
    ui_rx: &Receiver<ControllerMessage>,
    timeout: Duration,
    done: impl Fn(&SurfaceState) -> bool,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while !done(driver.state()) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match ui_rx.recv_timeout(remaining) {
            Ok(message) => driver.handle(message),
            Err(RecvTimeoutError::Timeout) => bail!("timed out waiting for the controller"),
            Err(RecvTimeoutError::Disconnected) => bail!("controller stopped unexpectedly"),
        }
    }
    Ok(())
}

fn print_report(state: &SurfaceState) {
    println!("== log");
    for line in state.log() {
        println!("{line}");
    }
    println!("== status: {}", state.status());
    if state.apply_enabled() {
        println!("== metrics");
        println!("{}", state.metrics_report());
        println!("== diff");
        println!("{}", state.rendered_diff());
    }
}

fn run(args: Args) -> Result<SurfaceState> {
    let timeout = Duration::from_secs(args.timeout_secs);
    let (cmd_tx, cmd_rx) = unbounded();
    let (ui_tx, ui_rx) = unbounded();

    let controller = Controller::new(
        Arc::new(FileDocumentProvider::new(&args.file, args.language)),
        Arc::new(StderrNotifier),
        ui_tx,
    );
    let worker = start_controller_bridge(controller, cmd_rx);

    let mut driver = SurfaceDriver::open(cmd_tx);
    wait_for(&mut driver, &ui_rx, timeout, |state| {
        state.source().is_some() || state.status() == NO_EDITOR_STATUS
    })?;
    if driver.state().source().is_none() {
        return Ok(driver.state().clone());
    }

    driver.handle(UserAction::EditBackendUrl(args.backend_url));
    driver.handle(UserAction::Optimize);
    wait_for(&mut driver, &ui_rx, timeout, |state| {
        state.status() == DONE_STATUS || state.status() == ERROR_STATUS
    })?;

    if args.apply && driver.state().apply_enabled() {
        driver.handle(UserAction::Apply);
    }

    let final_state = driver.state().clone();
    // Dropping the driver closes the queue; the bridge finishes pending work and exits.
    drop(driver);
    if worker.join().is_err() {
        bail!("controller thread panicked");
    }
    Ok(final_state)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = run(Args::parse())?;
    print_report(&state);
    if state.status() != DONE_STATUS {
        std::process::exit(1);
    }
    Ok(())
}
