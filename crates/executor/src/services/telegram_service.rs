use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::config::TelegramConfig;
use common::models::{OrderResult, TradeSignal};
use teloxide::prelude::*;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::services::traits::Notifier;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Telegram did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Failed to send Telegram message: {0}")]
    Send(String),
}

pub struct TelegramService {
    bot: Bot,
    chat_id: ChatId,
    timeout: Duration,
}

impl TelegramService {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
            chat_id: ChatId(config.chat_id),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl Notifier for TelegramService {
    /// Sends one message and waits for Telegram's answer, bounded by the
    /// configured timeout.
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let send = async { self.bot.send_message(self.chat_id, text.to_string()).await };

        match timeout(self.timeout, send).await {
            Ok(Ok(_)) => {
                debug!("Telegram message delivered");
                Ok(())
            }
            Ok(Err(e)) => Err(NotifyError::Send(e.to_string())),
            Err(_) => Err(NotifyError::Timeout(self.timeout)),
        }
    }
}

// Amounts are in the pair's quote asset, which the alert does not name.
pub fn signal_received(signal: &TradeSignal) -> String {
    format!(
        "📩 Signal received\n{} {} for {} (quote)\n{}",
        signal.side,
        signal.symbol,
        signal.notional.normalize(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

pub fn order_outcome(signal: &TradeSignal, result: &OrderResult) -> String {
    match result {
        OrderResult::Filled(order) => format!(
            "✅ Order placed\n{} {} qty {} (quote {})\nID: {} Status: {}",
            order.side,
            order.symbol,
            order.executed_qty.normalize(),
            order.quote_qty.normalize(),
            order.order_id,
            order.status
        ),
        OrderResult::Failed { error } => format!(
            "❌ Order failed\n{} {} for {} (quote)\nReason: {}",
            signal.side,
            signal.symbol,
            signal.notional.normalize(),
            error
        ),
    }
}
