//! Webhook endpoint handlers

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use common::config::WebhookCredentials;
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::services::signal_service::{ProcessError, SignalService};
use crate::webhook::auth;
use crate::webhook::types::{WebhookError, WebhookPayload, WebhookResponse};

pub const GREETING: &str = "Welcome to the Binance Webhook Bot! POST your alerts to /webhook.";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub signals: SignalService,
    pub credentials: Option<WebhookCredentials>,
}

impl WebhookState {
    pub fn new(signals: SignalService, credentials: Option<WebhookCredentials>) -> Self {
        Self {
            signals,
            credentials,
        }
    }
}

/// Greeting - GET /
pub async fn home() -> &'static str {
    GREETING
}

/// Signal endpoint - POST /webhook (and legacy POST /hook)
///
/// The response is sent only after the order attempt has finished.
pub async fn webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("webhook", %request_id);

    handle_signal(&state, &headers, &body).instrument(span).await
}

async fn handle_signal(
    state: &WebhookState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Json<WebhookResponse>, WebhookError> {
    let expected = state.credentials.as_ref();

    // A header, when present, is authoritative and checked before the body is read
    let header_authenticated = match auth::basic_credentials(headers) {
        Some(creds) => {
            let (username, password) =
                creds.inspect_err(|_| warn!("Malformed Authorization header"))?;
            auth::verify(expected, Some(username.as_str()), Some(password.as_str()))
                .inspect_err(|_| warn!("Rejected webhook: bad Basic credentials"))?;
            true
        }
        None => false,
    };

    // Only malformed JSON is reported before the credentials are checked
    let body: Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected webhook: invalid JSON: {}", e);
        WebhookError::Validation(format!("Invalid JSON body: {}", e))
    })?;

    if !header_authenticated {
        let username = body.get("username").and_then(Value::as_str);
        let password = body.get("password").and_then(Value::as_str);
        auth::verify(expected, username, password)
            .inspect_err(|_| warn!("Rejected webhook: missing or wrong credentials"))?;
    }

    let payload: WebhookPayload = serde_json::from_value(body).map_err(|e| {
        warn!("Rejected webhook: bad payload: {}", e);
        WebhookError::Validation(format!("Invalid payload: {}", e))
    })?;
    let signal = payload.to_signal().inspect_err(|e| warn!("Rejected webhook: {}", e))?;

    match state.signals.process(&signal).await {
        Ok(result) => {
            if let Some(qty) = result.filled_quantity() {
                info!("Webhook done: {} {} {} filled", signal.side, qty, signal.symbol);
            }
            Ok(Json(WebhookResponse::from_result(result)))
        }
        Err(ProcessError::Internal(e)) => Err(WebhookError::Internal(e)),
        Err(e) => Err(WebhookError::Internal(e.to_string())),
    }
}
