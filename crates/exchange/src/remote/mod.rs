pub mod account_response;
pub mod binance_client;
pub mod exchange_info_response;
pub mod order_response;
pub mod ticker_response;

pub use account_response::{AccountInformation, Balance};
pub use binance_client::BinanceClient;
pub use exchange_info_response::{ExchangeInfoResponse, SymbolFilter, SymbolInfo};
pub use order_response::OrderResponse;
pub use ticker_response::TickerPriceResponse;
