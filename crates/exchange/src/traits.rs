use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ExchangeError;

/// Conversion from a raw Binance payload into a domain model.
pub trait RemoteResponse<T> {
    fn to_model(&self) -> Result<T, ExchangeError>;

    fn parse_decimal(&self, field: &str, value: &str) -> Result<Decimal, ExchangeError> {
        Decimal::from_str(value.trim()).map_err(|_| ExchangeError::decode(field, value))
    }
}
