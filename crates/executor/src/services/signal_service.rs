use std::sync::Arc;

use common::models::{OrderConfirmation, OrderResult, TradeSignal};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::execution_service::{ExecutionService, SubmitError};
use crate::services::order_normalizer::{NormalizeError, OrderNormalizer};
use crate::services::telegram_service;
use crate::services::traits::{Exchange, Notifier};

const TRADING_DISABLED: &str = "Trading is disabled: exchange client is not configured";

#[derive(Error, Debug)]
pub enum ProcessError {
    /// Not configured, or unreachable while sizing the order
    #[error("{0}")]
    ExchangeUnavailable(String),
    #[error(transparent)]
    OrderConstraintViolation(NormalizeError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<NormalizeError> for ProcessError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::ArithmeticOverflow { .. } => Self::Internal(err.to_string()),
            NormalizeError::ExchangeUnreachable { .. } => Self::ExchangeUnavailable(err.to_string()),
            other => Self::OrderConstraintViolation(other),
        }
    }
}

struct Trading {
    normalizer: OrderNormalizer,
    executor: ExecutionService,
}

/// Runs one signal end to end: notify, size, submit, notify the outcome.
/// Shared read-only between concurrent requests.
pub struct SignalService {
    trading: Option<Trading>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl SignalService {
    pub fn new(exchange: Option<Arc<dyn Exchange>>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        let trading = exchange.map(|exchange| Trading {
            normalizer: OrderNormalizer::new(exchange.clone()),
            executor: ExecutionService::new(exchange),
        });
        Self { trading, notifier }
    }

    /// Returns the outcome that was notified. Only internal faults are
    /// returned as errors; a rejected or failed order is a `Failed` outcome.
    pub async fn process(&self, signal: &TradeSignal) -> Result<OrderResult, ProcessError> {
        info!("RECEIVED SIGNAL: {:?}", signal);
        self.notify(&telegram_service::signal_received(signal)).await;

        let (result, internal) = match self.execute(signal).await {
            Ok(order) => (OrderResult::Filled(order), None),
            Err(e) => {
                warn!("Signal {} {} not executed: {}", signal.side, signal.symbol, e);
                let result = OrderResult::Failed {
                    error: e.to_string(),
                };
                let internal = matches!(e, ProcessError::Internal(_)).then_some(e);
                (result, internal)
            }
        };

        self.notify(&telegram_service::order_outcome(signal, &result)).await;

        match internal {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    async fn execute(&self, signal: &TradeSignal) -> Result<OrderConfirmation, ProcessError> {
        let trading = self
            .trading
            .as_ref()
            .ok_or_else(|| ProcessError::ExchangeUnavailable(TRADING_DISABLED.to_string()))?;

        let order = trading.normalizer.prepare(signal).await?;
        Ok(trading.executor.submit(&order).await?)
    }

    /// Best effort: a failed notification never affects the signal.
    async fn notify(&self, text: &str) {
        match &self.notifier {
            Some(notifier) => {
                if let Err(e) = notifier.notify(text).await {
                    warn!("{}", e);
                }
            }
            None => debug!("Notifications disabled, dropping: {}", text),
        }
    }
}
