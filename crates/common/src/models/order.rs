use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Side;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: u64,
    pub symbol: String,
    pub side: Side,
    pub status: String,
    pub executed_qty: Decimal,
    pub quote_qty: Decimal,
    pub transact_time: Option<DateTime<Utc>>,
}

/// Outcome of one order attempt, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderResult {
    Filled(OrderConfirmation),
    Failed { error: String },
}

impl OrderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OrderResult::Filled(_))
    }

    pub fn filled_quantity(&self) -> Option<Decimal> {
        match self {
            OrderResult::Filled(order) => Some(order.executed_qty),
            OrderResult::Failed { .. } => None,
        }
    }
}
