use std::str::FromStr;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use common::models::{OrderResult, Side, TradeSignal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw alert body. Every field is optional here so that missing fields are
/// reported together instead of failing on the first one.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub side: Option<String>,
    /// Older alert templates send `"action": "buy"` instead of `side`
    pub action: Option<String>,
    pub symbol: Option<String>,
    pub usdt: Option<Value>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl WebhookPayload {
    pub fn to_signal(&self) -> Result<TradeSignal, WebhookError> {
        let side = self
            .side
            .as_deref()
            .or(self.action.as_deref())
            .filter(|s| !s.trim().is_empty());
        let symbol = self.symbol.as_deref().filter(|s| !s.trim().is_empty());
        let usdt = self.usdt.as_ref().filter(|v| !v.is_null());

        let missing: Vec<&str> = [
            ("side", side.is_none()),
            ("symbol", symbol.is_none()),
            ("usdt", usdt.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(side), Some(symbol), Some(usdt)) = (side, symbol, usdt) else {
            return Err(WebhookError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let side = side
            .parse::<Side>()
            .map_err(|e| WebhookError::Validation(e.to_string()))?;
        let notional = parse_amount(usdt)?;

        Ok(TradeSignal::new(side, symbol, notional))
    }
}

/// Accepts `100`, `12.5`, `"12.5"` or `1e2`; the amount must be positive.
fn parse_amount(value: &Value) -> Result<Decimal, WebhookError> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(WebhookError::Validation(format!(
                "usdt must be a number, got {}",
                other
            )));
        }
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| WebhookError::Validation(format!("usdt is not a valid amount: {}", raw)))?;

    if amount <= Decimal::ZERO {
        return Err(WebhookError::Validation(format!(
            "usdt must be greater than zero, got {}",
            raw
        )));
    }
    Ok(amount)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResult>,
}

impl WebhookResponse {
    /// `success` when an order was placed, `failed` otherwise.
    pub fn from_result(result: OrderResult) -> Self {
        let message = match &result {
            OrderResult::Filled(order) => format!(
                "{} {} {} executed",
                order.side,
                order.executed_qty.normalize(),
                order.symbol
            ),
            OrderResult::Failed { error } => error.clone(),
        };
        let status = if result.is_success() {
            ResponseStatus::Success
        } else {
            ResponseStatus::Failed
        };

        Self {
            status,
            message,
            order: Some(result),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            order: None,
        }
    }
}

/// Failures that end a request before or outside of order processing.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(WebhookResponse::error(self.to_string()))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"webhook\""),
            );
        }
        response
    }
}
