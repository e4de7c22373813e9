use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

impl RemoteResponse<Decimal> for TickerPriceResponse {
    fn to_model(&self) -> Result<Decimal, ExchangeError> {
        self.parse_decimal("price", &self.price)
    }
}
