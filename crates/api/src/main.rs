use std::sync::Arc;

use anyhow::Context;

use quill_api::app::{Backends, build_app};
use quill_api::config::ApiConfig;
use quill_auth::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quill_observability::init(quill_observability::LogFormat::from_env());

    let config = ApiConfig::from_env().context("failed to load configuration")?;
    let backends = Backends::from_config(&config).await?;
    let app = build_app(&config, backends, Arc::new(SystemClock));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, algorithm = ?config.token.algorithm, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
