//! usage-server - HTTP service answering Kubernetes resource usage queries
//!
//! Queries are answered from `kubectl top` and `kubectl get` output of the
//! configured cluster.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use usage_lib::{KubectlSource, QueryRouter};
use usage_server::{api, config::ServerConfig};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = SERVER_VERSION, "Starting usage-server");

    let config = ServerConfig::load()?;
    info!(
        port = config.port,
        kubectl = %config.kubectl,
        context = ?config.context,
        timeout_secs = config.timeout_secs,
        "Server configured"
    );

    let source = Arc::new(KubectlSource::new(config.kubectl_config()));
    let router = QueryRouter::new(source);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app_state = Arc::new(api::AppState::new(router, shutdown_rx));
    let mut api_handle = tokio::spawn(api::serve(config.port, app_state));

    tokio::select! {
        result = &mut api_handle => {
            // Server stopped on its own, e.g. the port was taken
            return result?;
        }
        signal = tokio::signal::ctrl_c() => signal?,
    }

    info!("SIGINT received, shutting down");
    let _ = shutdown_tx.send(true);

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "API server failed"),
        Err(e) => error!(error = %e, "API server task panicked"),
    }

    Ok(())
}
