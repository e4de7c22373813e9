use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};

use common::config::AppConfig;
use common::logger;
use exchange::BinanceClient;

use crate::services::execution_service;
use crate::services::signal_service::SignalService;
use crate::services::telegram_service::TelegramService;
use crate::services::traits::{Exchange, Notifier};
use crate::webhook::WebhookState;

mod services;
mod webhook;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();
    info!("System starting up...");

    let config = AppConfig::from_env();

    let exchange: Option<Arc<dyn Exchange>> = match &config.exchange {
        Some(exchange_config) => match BinanceClient::new(exchange_config) {
            Ok(client) => {
                info!("Using Binance at {}", exchange_config.base_url);
                execution_service::log_account_status(&client).await;
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("Failed to build Binance client, trading is disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let notifier: Option<Arc<dyn Notifier>> = config
        .telegram
        .as_ref()
        .map(|telegram| Arc::new(TelegramService::new(telegram)) as Arc<dyn Notifier>);

    let state = Arc::new(WebhookState::new(
        SignalService::new(exchange, notifier),
        config.credentials.clone(),
    ));

    webhook::serve(&config.bind_address(), state).await?;

    info!("Shut down cleanly");
    Ok(())
}
