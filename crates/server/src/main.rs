use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod extract;
mod llm;
mod normalize;

use api::{build_router, AppState};
use config::load_settings;
use llm::OllamaModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let model = OllamaModel::new(
        settings.ollama_url.clone(),
        settings.model.clone(),
        Duration::from_secs(settings.request_timeout_seconds),
    )
    .context("failed to build model client")?;

    let state = Arc::new(AppState {
        model: Arc::new(model),
    });
    let app = build_router(state, settings.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind '{}'", settings.bind_addr))?;
    info!(
        bind_addr = %settings.bind_addr,
        ollama_url = %settings.ollama_url,
        model = %settings.model,
        "optimizer server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
