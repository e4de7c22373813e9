use std::sync::Arc;

use common::models::{OrderConfirmation, Side};
use exchange::{BinanceClient, ExchangeError};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::services::order_normalizer::NormalizedOrder;
use crate::services::traits::Exchange;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Insufficient {asset} balance: need {required}, have {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Places market orders. Every failure is final for the signal, nothing is retried.
pub struct ExecutionService {
    exchange: Arc<dyn Exchange>,
}

impl ExecutionService {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    pub async fn submit(&self, order: &NormalizedOrder) -> Result<OrderConfirmation, SubmitError> {
        if order.side == Side::Buy {
            let asset = &order.constraints.quote_asset;
            let required = order.value();
            let available = self.exchange.free_balance(asset).await?;

            if available < required {
                warn!(
                    "Skipping BUY {}: {} {} required, {} available",
                    order.symbol, required, asset, available
                );
                return Err(SubmitError::InsufficientBalance {
                    asset: asset.clone(),
                    required,
                    available,
                });
            }
        }

        info!(
            "Executing MARKET {} {} qty {}",
            order.side, order.symbol, order.quantity
        );

        match self
            .exchange
            .market_order(&order.symbol, order.side, order.quantity)
            .await
        {
            Ok(confirmation) => {
                info!(
                    "ORDER EXECUTED: ID={}, Status={}, Qty={}",
                    confirmation.order_id, confirmation.status, confirmation.executed_qty
                );
                Ok(confirmation)
            }
            Err(e) => {
                error!("ORDER FAILED: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Logs whether the API key can trade and the funded balances. Only used as a
/// startup connectivity check, so failures are logged and swallowed.
pub async fn log_account_status(client: &BinanceClient) {
    match client.get_account().await {
        Ok(info) => {
            info!("Binance Account Connected. Can Trade: {}", info.can_trade);
            for b in info.non_zero_balances() {
                info!("Balance: {} Free={} Locked={}", b.asset, b.free, b.locked);
            }
        }
        Err(e) => error!("Failed to fetch account info: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::traits::MockExchange;
    use common::models::SymbolConstraints;
    use rust_decimal_macros::dec;

    fn order(side: Side) -> NormalizedOrder {
        NormalizedOrder {
            symbol: "BTCUSDT".into(),
            side,
            quantity: dec!(0.002),
            price: dec!(50000),
            constraints: SymbolConstraints {
                symbol: "BTCUSDT".into(),
                base_asset: "BTC".into(),
                quote_asset: "USDT".into(),
                min_quantity: dec!(0.0001),
                step_size: dec!(0.0001),
                min_notional: dec!(10),
            },
        }
    }

    fn confirmation(side: Side) -> OrderConfirmation {
        OrderConfirmation {
            order_id: 7,
            symbol: "BTCUSDT".into(),
            side,
            status: "FILLED".into(),
            executed_qty: dec!(0.002),
            quote_qty: dec!(100),
            transact_time: None,
        }
    }

    #[tokio::test]
    async fn buy_checks_quote_balance_first() {
        let mut exchange = MockExchange::new();
        exchange
            .expect_free_balance()
            .withf(|asset| asset.eq_ignore_ascii_case("USDT"))
            .times(1)
            .returning(|_| Ok(dec!(150)));
        exchange
            .expect_market_order()
            .withf(|symbol, side, qty| {
                symbol.eq_ignore_ascii_case("BTCUSDT") && *side == Side::Buy && *qty == dec!(0.002)
            })
            .times(1)
            .returning(|_, side, _| Ok(confirmation(side)));

        let service = ExecutionService::new(Arc::new(exchange));
        let result = service.submit(&order(Side::Buy)).await.unwrap();

        assert_eq!(result.order_id, 7);
    }

    #[tokio::test]
    async fn buy_without_funds_is_not_sent() {
        let mut exchange = MockExchange::new();
        exchange.expect_free_balance().returning(|_| Ok(dec!(99.99)));
        exchange.expect_market_order().never();

        let service = ExecutionService::new(Arc::new(exchange));
        match service.submit(&order(Side::Buy)).await {
            Err(SubmitError::InsufficientBalance {
                required,
                available,
                ..
            }) => {
                assert_eq!(required, dec!(100));
                assert_eq!(available, dec!(99.99));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn sell_skips_balance_check() {
        let mut exchange = MockExchange::new();
        exchange.expect_free_balance().never();
        exchange
            .expect_market_order()
            .times(1)
            .returning(|_, side, _| Ok(confirmation(side)));

        let service = ExecutionService::new(Arc::new(exchange));
        let result = service.submit(&order(Side::Sell)).await.unwrap();

        assert_eq!(result.side, Side::Sell);
    }

    #[tokio::test]
    async fn exchange_rejection_is_propagated() {
        let mut exchange = MockExchange::new();
        exchange.expect_market_order().times(1).returning(|_, _, _| {
            Err(ExchangeError::from_response(
                400,
                r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#,
            ))
        });

        let service = ExecutionService::new(Arc::new(exchange));
        let err = service.submit(&order(Side::Sell)).await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Exchange(ExchangeError::Api { code: -2010, .. })
        ));
    }
}
