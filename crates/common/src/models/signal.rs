use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid side '{0}', expected BUY or SELL")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// A trading instruction parsed from one webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    pub side: Side,
    pub symbol: String, // "BTCUSDT"
    pub notional: Decimal, // quote currency, e.g. USDT
}

impl TradeSignal {
    pub fn new(side: Side, symbol: &str, notional: Decimal) -> Self {
        Self {
            side,
            symbol: symbol.trim().to_uppercase(),
            notional,
        }
    }
}
