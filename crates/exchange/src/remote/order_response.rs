use chrono::{DateTime, Utc};
use common::models::{OrderConfirmation, Side};
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: u64,
    pub symbol: String,
    pub side: String,
    pub status: String,
    #[serde(rename = "transactTime")]
    pub transact_time: Option<i64>,
    #[serde(rename = "executedQty")]
    pub executed_qty: String,
    #[serde(rename = "cummulativeQuoteQty")]
    pub cummulative_quote_qty: String,
}

impl RemoteResponse<OrderConfirmation> for OrderResponse {
    fn to_model(&self) -> Result<OrderConfirmation, ExchangeError> {
        let side = self
            .side
            .parse::<Side>()
            .map_err(|e| ExchangeError::Decode(e.to_string()))?;

        Ok(OrderConfirmation {
            order_id: self.order_id,
            symbol: self.symbol.clone(),
            side,
            status: self.status.clone(),
            executed_qty: self.parse_decimal("executedQty", &self.executed_qty)?,
            quote_qty: self.parse_decimal("cummulativeQuoteQty", &self.cummulative_quote_qty)?,
            transact_time: self.transact_time.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}
