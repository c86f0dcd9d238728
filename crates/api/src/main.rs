use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use webnotas_api::app::{build_app, services};
use webnotas_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    webnotas_observability::init(config.log_format);

    let services = services::build_services(&config)
        .await
        .with_context(|| format!("failed to open store at {}", config.db_path().display()))?;
    let store = services.store.clone();

    let app = build_app(Arc::new(services));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Jobs still in flight stay `running` in the database.
    store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
