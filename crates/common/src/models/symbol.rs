use rust_decimal::Decimal;

/// Trading rules of one pair, fetched fresh for every signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolConstraints {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub min_quantity: Decimal,
    pub step_size: Decimal,
    pub min_notional: Decimal,
}
