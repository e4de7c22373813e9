use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ExchangeError;
use crate::traits::RemoteResponse;

#[derive(Debug, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

impl RemoteResponse<Decimal> for Balance {
    fn to_model(&self) -> Result<Decimal, ExchangeError> {
        self.parse_decimal("free", &self.free)
    }
}

#[derive(Debug, Deserialize)]
pub struct AccountInformation {
    pub balances: Vec<Balance>,
    #[serde(rename = "canTrade")]
    pub can_trade: bool,
}

impl AccountInformation {
    /// Free amount of `asset`; an asset absent from the account has none.
    pub fn free_balance(&self, asset: &str) -> Result<Decimal, ExchangeError> {
        match self
            .balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
        {
            Some(balance) => balance.to_model(),
            None => Ok(Decimal::ZERO),
        }
    }

    pub fn non_zero_balances(&self) -> impl Iterator<Item = &Balance> {
        self.balances
            .iter()
            .filter(|b| b.to_model().map(|free| free > Decimal::ZERO).unwrap_or(false))
    }
}
