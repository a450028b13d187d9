//! HTTP endpoint serving the exposition text
//!
//! Routes:
//! - `GET /metrics` - all stored samples in the text exposition format
//! - `GET /healthz` - liveness check

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info};

use crate::metrics::{MetricsStore, TEXT_CONTENT_TYPE};
use crate::Error;

async fn metrics_handler(State(store): State<Arc<MetricsStore>>) -> Response {
    match store.render() {
        Ok(body) => ([(CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

async fn healthz_handler() -> &'static str {
    "ok"
}

/// Create the metrics router
pub fn metrics_router(store: Arc<MetricsStore>) -> axum::Router {
    axum::Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(store)
}

/// Serve the metrics router on `addr` until the task is dropped
pub async fn serve(addr: SocketAddr, store: Arc<MetricsStore>) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "serving metrics");

    axum::serve(listener, metrics_router(store))
        .await
        .map_err(|e| Error::server(format!("metrics server failed: {e}")))
}
