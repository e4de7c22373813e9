pub mod order;
pub mod signal;
pub mod symbol;

pub use order::{OrderConfirmation, OrderResult};
pub use signal::{ParseSideError, Side, TradeSignal};
pub use symbol::SymbolConstraints;
