use async_trait::async_trait;
use common::models::{OrderConfirmation, Side, SymbolConstraints};
use exchange::{BinanceClient, ExchangeError};
use rust_decimal::Decimal;

use crate::services::telegram_service::NotifyError;

/// The exchange operations a signal needs. Implemented by `BinanceClient`
/// and mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn symbol_constraints(&self, symbol: &str) -> Result<SymbolConstraints, ExchangeError>;

    async fn current_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    async fn free_balance(&self, asset: &str) -> Result<Decimal, ExchangeError>;

    async fn market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderConfirmation, ExchangeError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl Exchange for BinanceClient {
    async fn symbol_constraints(&self, symbol: &str) -> Result<SymbolConstraints, ExchangeError> {
        self.exchange_info(symbol).await
    }

    async fn current_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        self.ticker_price(symbol).await
    }

    async fn free_balance(&self, asset: &str) -> Result<Decimal, ExchangeError> {
        BinanceClient::free_balance(self, asset).await
    }

    async fn market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderConfirmation, ExchangeError> {
        self.post_order(symbol, side, quantity).await
    }
}
