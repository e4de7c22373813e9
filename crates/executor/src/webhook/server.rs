use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::webhook::handlers::{self, WebhookState};

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/webhook", post(handlers::webhook_handler))
        // Alerts created against the first revision still post here
        .route("/hook", post(handlers::webhook_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: &str, state: Arc<WebhookState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Webhook server listening on http://{}", addr);
    info!("  GET  /");
    info!("  POST /webhook");
    info!("  POST /hook");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server error")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping webhook server"),
        Err(e) => {
            error!("Cannot listen for Ctrl-C, running until killed: {}", e);
            std::future::pending::<()>().await
        }
    }
}
