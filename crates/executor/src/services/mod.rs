pub mod execution_service;
pub mod order_normalizer;
pub mod signal_service;
pub mod telegram_service;
pub mod traits;
