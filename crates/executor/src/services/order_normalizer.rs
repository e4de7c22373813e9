use std::sync::Arc;

use common::models::{Side, SymbolConstraints, TradeSignal};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::services::traits::Exchange;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Order value {value} is below the minimum notional {min_notional} for {symbol}")]
    InsufficientNotional {
        symbol: String,
        value: Decimal,
        min_notional: Decimal,
    },
    #[error(
        "Minimum quantity {min_quantity} of {symbol} costs more than the requested {notional}"
    )]
    BelowMinimumQuantity {
        symbol: String,
        notional: Decimal,
        min_quantity: Decimal,
    },
    #[error("Trading rules for {symbol} are unavailable: {reason}")]
    SymbolMetadataUnavailable { symbol: String, reason: String },
    #[error("Exchange unreachable while sizing {symbol}: {reason}")]
    ExchangeUnreachable { symbol: String, reason: String },
    #[error("Invalid price {price} for {symbol}")]
    InvalidPrice { symbol: String, price: Decimal },
    #[error("Arithmetic overflow while sizing {symbol}")]
    ArithmeticOverflow { symbol: String },
}

/// An order that passed every exchange filter and is ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub constraints: SymbolConstraints,
}

impl NormalizedOrder {
    pub fn value(&self) -> Decimal {
        self.quantity * self.price
    }
}

pub struct OrderNormalizer {
    exchange: Arc<dyn Exchange>,
}

impl OrderNormalizer {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// Fetches the pair's trading rules and last price, then sizes the order.
    pub async fn prepare(&self, signal: &TradeSignal) -> Result<NormalizedOrder, NormalizeError> {
        let unavailable = |e: exchange::ExchangeError| {
            let symbol = signal.symbol.clone();
            let reason = e.to_string();
            if e.is_unavailable() {
                NormalizeError::ExchangeUnreachable { symbol, reason }
            } else {
                NormalizeError::SymbolMetadataUnavailable { symbol, reason }
            }
        };

        let constraints = self
            .exchange
            .symbol_constraints(&signal.symbol)
            .await
            .map_err(unavailable)?;
        let price = self
            .exchange
            .current_price(&signal.symbol)
            .await
            .map_err(unavailable)?;

        debug!(
            "{} rules: minQty={} stepSize={} minNotional={} price={}",
            signal.symbol,
            constraints.min_quantity,
            constraints.step_size,
            constraints.min_notional,
            price
        );

        let quantity = normalize_quantity(&signal.symbol, signal.notional, price, &constraints)?;

        info!(
            "Sized {} {}: {} {} @ {} -> qty {}",
            signal.side, signal.symbol, signal.notional, constraints.quote_asset, price, quantity
        );

        Ok(NormalizedOrder {
            symbol: signal.symbol.clone(),
            side: signal.side,
            quantity,
            price,
            constraints,
        })
    }
}

/// Converts a quote-currency amount into a base quantity accepted by the
/// pair's LOT_SIZE and NOTIONAL filters.
///
/// The quantity is rounded down to the step so the order never spends more
/// than `notional`. When that lands under the minimum quantity, the minimum is
/// used instead, provided it still fits in the budget.
pub fn normalize_quantity(
    symbol: &str,
    notional: Decimal,
    price: Decimal,
    constraints: &SymbolConstraints,
) -> Result<Decimal, NormalizeError> {
    let overflow = || NormalizeError::ArithmeticOverflow {
        symbol: symbol.to_string(),
    };

    if price <= Decimal::ZERO {
        return Err(NormalizeError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        });
    }

    if notional < constraints.min_notional {
        return Err(NormalizeError::InsufficientNotional {
            symbol: symbol.to_string(),
            value: notional,
            min_notional: constraints.min_notional,
        });
    }

    let raw = notional.checked_div(price).ok_or_else(overflow)?;
    let step = constraints.step_size;

    let mut quantity = round_to_step(raw, step, false).ok_or_else(overflow)?;
    let min_quantity = round_to_step(constraints.min_quantity, step, true).ok_or_else(overflow)?;

    if quantity < min_quantity || quantity.is_zero() {
        let min_cost = min_quantity.checked_mul(price).ok_or_else(overflow)?;
        if min_quantity.is_zero() || min_cost > notional {
            return Err(NormalizeError::BelowMinimumQuantity {
                symbol: symbol.to_string(),
                notional,
                min_quantity: constraints.min_quantity,
            });
        }
        quantity = min_quantity;
    }

    let value = quantity.checked_mul(price).ok_or_else(overflow)?;
    if value < constraints.min_notional {
        return Err(NormalizeError::InsufficientNotional {
            symbol: symbol.to_string(),
            value,
            min_notional: constraints.min_notional,
        });
    }

    Ok(quantity.normalize())
}

/// Snaps `value` onto the `step` grid. A zero step means the pair has no
/// step restriction.
fn round_to_step(value: Decimal, step: Decimal, up: bool) -> Option<Decimal> {
    if step <= Decimal::ZERO {
        return Some(value);
    }
    let steps = value.checked_div(step)?;
    let steps = if up { steps.ceil() } else { steps.floor() };
    steps.checked_mul(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::traits::MockExchange;
    use exchange::ExchangeError;
    use rust_decimal_macros::dec;

    fn btcusdt() -> SymbolConstraints {
        SymbolConstraints {
            symbol: "BTCUSDT".into(),
            base_asset: "BTC".into(),
            quote_asset: "USDT".into(),
            min_quantity: dec!(0.0001),
            step_size: dec!(0.0001),
            min_notional: dec!(10),
        }
    }

    fn is_step_multiple(quantity: Decimal, step: Decimal) -> bool {
        (quantity % step).is_zero()
    }

    #[test]
    fn exact_multiple_is_accepted() {
        let qty = normalize_quantity("BTCUSDT", dec!(100), dec!(50000), &btcusdt()).unwrap();
        assert_eq!(qty, dec!(0.002));
    }

    #[test]
    fn raw_quantity_is_rounded_down_to_step() {
        // 123 / 50000 = 0.00246
        let qty = normalize_quantity("BTCUSDT", dec!(123), dec!(50000), &btcusdt()).unwrap();
        assert_eq!(qty, dec!(0.0024));
        assert!(qty * dec!(50000) <= dec!(123));
    }

    #[test]
    fn results_stay_on_step_grid_and_within_budget() {
        let constraints = SymbolConstraints {
            min_quantity: dec!(0.00001),
            step_size: dec!(0.00001),
            min_notional: dec!(5),
            ..btcusdt()
        };
        let prices = [dec!(43251.17), dec!(67999.99), dec!(12345.6789), dec!(100000)];
        let notionals = [dec!(5.5), dec!(11), dec!(99.99), dec!(250), dec!(1234.56)];

        for price in prices {
            for notional in notionals {
                let qty = normalize_quantity("BTCUSDT", notional, price, &constraints).unwrap();
                assert!(is_step_multiple(qty, constraints.step_size), "{} @ {}", notional, price);
                assert!(qty * price <= notional, "{} @ {}", notional, price);
                assert!(qty >= constraints.min_quantity);
                assert!(qty * price >= constraints.min_notional);
            }
        }
    }

    #[test]
    fn tiny_steps_do_not_drift() {
        // 0.1 + 0.2 style inputs that break binary floating point
        let constraints = SymbolConstraints {
            min_quantity: dec!(0.00000001),
            step_size: dec!(0.00000001),
            min_notional: dec!(0.0001),
            ..btcusdt()
        };
        let qty = normalize_quantity("BTCUSDT", dec!(0.3), dec!(0.1), &constraints).unwrap();
        assert_eq!(qty, dec!(3));
    }

    #[test]
    fn notional_below_minimum_is_rejected() {
        let err = normalize_quantity("BTCUSDT", dec!(0.001), dec!(50000), &btcusdt()).unwrap_err();
        assert!(matches!(err, NormalizeError::InsufficientNotional { .. }));
    }

    #[test]
    fn rounding_below_min_notional_is_rejected() {
        // 10.45 / 5300 = 0.00197 floors to 0.001, which is only worth 5.3
        let constraints = SymbolConstraints {
            min_quantity: dec!(0.001),
            step_size: dec!(0.001),
            min_notional: dec!(10.4),
            ..btcusdt()
        };
        let err = normalize_quantity("BTCUSDT", dec!(10.45), dec!(5300), &constraints).unwrap_err();
        match err {
            NormalizeError::InsufficientNotional { value, .. } => assert_eq!(value, dec!(5.3)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn min_quantity_boundary() {
        // 7.4 / 5 = 1.48 floors to 1.0, exactly the minimum
        // 0.9 / 1 floors to 0.5 and the minimum of 1.0 would cost more than 0.9
        let constraints = SymbolConstraints {
            min_quantity: dec!(1),
            step_size: dec!(0.5),
            min_notional: Decimal::ZERO,
            ..btcusdt()
        };
        assert_eq!(
            normalize_quantity("XUSDT", dec!(7.4), dec!(5), &constraints).unwrap(),
            dec!(1)
        );
        assert!(matches!(
            normalize_quantity("XUSDT", dec!(0.9), dec!(1), &constraints),
            Err(NormalizeError::BelowMinimumQuantity { .. })
        ));
    }

    #[test]
    fn off_grid_min_quantity_is_raised_to_step() {
        let constraints = SymbolConstraints {
            min_quantity: dec!(0.15),
            step_size: dec!(0.1),
            min_notional: Decimal::ZERO,
            ..btcusdt()
        };
        // 0.16 raw -> floor 0.1 < min 0.15 -> lifted to 0.2 which costs 0.2 > 0.16
        assert!(matches!(
            normalize_quantity("XUSDT", dec!(0.16), dec!(1), &constraints),
            Err(NormalizeError::BelowMinimumQuantity { .. })
        ));
        assert_eq!(
            normalize_quantity("XUSDT", dec!(0.25), dec!(1), &constraints).unwrap(),
            dec!(0.2)
        );
    }

    #[test]
    fn non_positive_price_is_rejected() {
        assert!(matches!(
            normalize_quantity("BTCUSDT", dec!(100), Decimal::ZERO, &btcusdt()),
            Err(NormalizeError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn zero_step_keeps_raw_quantity() {
        let constraints = SymbolConstraints {
            min_quantity: Decimal::ZERO,
            step_size: Decimal::ZERO,
            min_notional: Decimal::ZERO,
            ..btcusdt()
        };
        let qty = normalize_quantity("XUSDT", dec!(10), dec!(4), &constraints).unwrap();
        assert_eq!(qty, dec!(2.5));
    }

    #[tokio::test]
    async fn prepare_fetches_rules_and_price() {
        let mut exchange = MockExchange::new();
        exchange
            .expect_symbol_constraints()
            .times(1)
            .returning(|_| Ok(btcusdt()));
        exchange
            .expect_current_price()
            .times(1)
            .returning(|_| Ok(dec!(50000)));

        let normalizer = OrderNormalizer::new(Arc::new(exchange));
        let signal = TradeSignal::new(Side::Buy, "BTCUSDT", dec!(100));
        let order = normalizer.prepare(&signal).await.unwrap();

        assert_eq!(order.quantity, dec!(0.002));
        assert_eq!(order.value(), dec!(100));
        assert_eq!(order.constraints.quote_asset, "USDT");
    }

    #[tokio::test]
    async fn missing_metadata_is_reported() {
        let mut exchange = MockExchange::new();
        exchange
            .expect_symbol_constraints()
            .returning(|s| Err(ExchangeError::SymbolNotFound(s.to_string())));
        exchange.expect_current_price().never();

        let normalizer = OrderNormalizer::new(Arc::new(exchange));
        let signal = TradeSignal::new(Side::Sell, "NOPEUSDT", dec!(100));

        assert!(matches!(
            normalizer.prepare(&signal).await,
            Err(NormalizeError::SymbolMetadataUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn exchange_outage_is_not_a_constraint_problem() {
        let mut exchange = MockExchange::new();
        exchange.expect_symbol_constraints().returning(|_| Ok(btcusdt()));
        exchange
            .expect_current_price()
            .returning(|_| Err(ExchangeError::from_response(503, "Service Unavailable")));

        let normalizer = OrderNormalizer::new(Arc::new(exchange));
        let signal = TradeSignal::new(Side::Buy, "BTCUSDT", dec!(100));

        assert!(matches!(
            normalizer.prepare(&signal).await,
            Err(NormalizeError::ExchangeUnreachable { .. })
        ));
    }
}
