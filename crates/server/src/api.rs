//! HTTP API for usage queries, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use usage_lib::{QueryOptions, QueryRouter, ResultEnvelope};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub router: QueryRouter,
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// `shutdown` flips to `true` when the server is stopping; queries still
    /// in flight at that point are cancelled
    pub fn new(router: QueryRouter, shutdown: watch::Receiver<bool>) -> Self {
        Self { router, shutdown }
    }
}

/// Body of `POST /v1/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub options: QueryOptions,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    source: String,
}

/// HTTP status for an envelope: 200 for results, otherwise by error code
pub fn status_for(envelope: &ResultEnvelope) -> StatusCode {
    match envelope.error_code() {
        None => StatusCode::OK,
        Some("not_found") => StatusCode::NOT_FOUND,
        Some("invalid_request") => StatusCode::BAD_REQUEST,
        Some("fetch_failed") => StatusCode::BAD_GATEWAY,
        Some("timeout") => StatusCode::GATEWAY_TIMEOUT,
        Some("cancelled") => StatusCode::SERVICE_UNAVAILABLE,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    let mut shutdown = state.shutdown.clone();
    let cancel = async move {
        if shutdown.wait_for(|stopping| *stopping).await.is_err() {
            // Sender gone without a shutdown: never cancel
            std::future::pending::<()>().await;
        }
    };

    let envelope = state
        .router
        .handle_with_cancel(&request.query, request.options, cancel)
        .await;

    (status_for(&envelope), Json(envelope))
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = if *state.shutdown.borrow() {
        (StatusCode::SERVICE_UNAVAILABLE, "stopping")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status.0,
        Json(HealthResponse {
            status: status.1,
            source: state.router.aggregator().source_id().to_string(),
        }),
    )
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/query", post(query))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API until `shutdown` flips to `true`
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let mut shutdown = state.shutdown.clone();
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stopping| *stopping).await;
        })
        .await?;

    Ok(())
}
