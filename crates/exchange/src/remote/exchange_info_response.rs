use common::models::SymbolConstraints;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfoResponse {
    pub fn find(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}

#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    #[serde(rename(deserialize = "baseAsset"))]
    pub base_asset: String,
    #[serde(rename(deserialize = "quoteAsset"))]
    pub quote_asset: String,
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "minQty")]
        min_qty: String,
        #[serde(rename = "stepSize")]
        step_size: String,
    },
    #[serde(rename = "NOTIONAL")]
    Notional {
        #[serde(rename = "minNotional")]
        min_notional: String,
    },
    // Older spot symbols still report the legacy filter name
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional {
        #[serde(rename = "minNotional")]
        min_notional: String,
    },
    #[serde(other)]
    Other,
}

impl RemoteResponse<SymbolConstraints> for SymbolInfo {
    fn to_model(&self) -> Result<SymbolConstraints, ExchangeError> {
        let (min_qty, step_size) = self
            .filters
            .iter()
            .find_map(|f| match f {
                SymbolFilter::LotSize {
                    min_qty,
                    step_size,
                } => Some((min_qty, step_size)),
                _ => None,
            })
            .ok_or_else(|| ExchangeError::MissingFilter(self.symbol.clone()))?;

        let min_notional = match self.filters.iter().find_map(|f| match f {
            SymbolFilter::Notional { min_notional } | SymbolFilter::MinNotional { min_notional } => {
                Some(min_notional)
            }
            _ => None,
        }) {
            Some(raw) => self.parse_decimal("minNotional", raw)?,
            None => Decimal::ZERO,
        };

        Ok(SymbolConstraints {
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            min_quantity: self.parse_decimal("minQty", min_qty)?,
            step_size: self.parse_decimal("stepSize", step_size)?,
            min_notional,
        })
    }
}
