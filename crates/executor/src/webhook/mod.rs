//! TradingView webhook receiver
//!
//! Routes:
//! - `GET /` greeting
//! - `POST /webhook` trading signal (`POST /hook` kept for older alerts)
//!
//! Alert body:
//! `{"side": "BUY", "symbol": "BTCUSDT", "usdt": 100, "username": "...", "password": "..."}`
//! Credentials can also be sent as an `Authorization: Basic` header.

mod auth;
pub mod handlers;
mod server;
mod types;

pub use handlers::WebhookState;
pub use server::serve;
