use std::time::{SystemTime, UNIX_EPOCH};

use common::config::ExchangeConfig;
use common::models::{OrderConfirmation, Side, SymbolConstraints};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, error, info};

use crate::error::ExchangeError;
use crate::remote::{AccountInformation, ExchangeInfoResponse, OrderResponse, TickerPriceResponse};
use crate::traits::RemoteResponse;

type HmacSha256 = Hmac<Sha256>;

/// Spot REST client. Holds only credentials and a connection pool, so one
/// instance is shared by every request.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_key: String,
    recv_window_ms: u64,
}

impl BinanceClient {
    pub fn new(config: &ExchangeConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent("tradingview_webhook_bot/0.1.0")
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            recv_window_ms: config.recv_window_ms,
        })
    }

    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_query(&self, params: &str, timestamp: u64) -> String {
        let query = if params.is_empty() {
            format!("recvWindow={}&timestamp={}", self.recv_window_ms, timestamp)
        } else {
            format!(
                "{}&recvWindow={}&timestamp={}",
                params, self.recv_window_ms, timestamp
            )
        };
        let signature = self.sign(&query);
        format!("{}&signature={}", query, signature)
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;
        Self::decode(path, resp).await
    }

    async fn signed_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &str,
    ) -> Result<T, ExchangeError> {
        let full_query = self.signed_query(params, Self::timestamp());
        let url = format!("{}{}?{}", self.base_url, path, full_query);

        let resp = self
            .client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, ExchangeError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            error!("Binance {} failed: {}", path, body);
            return Err(ExchangeError::from_response(status.as_u16(), &body));
        }

        debug!("Binance {} -> {}", path, body);
        serde_json::from_str::<T>(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
    }

    pub async fn exchange_info(&self, symbol: &str) -> Result<SymbolConstraints, ExchangeError> {
        let symbol = symbol.to_uppercase();
        let info: ExchangeInfoResponse = self
            .public_get("/api/v3/exchangeInfo", &[("symbol", symbol.as_str())])
            .await?;

        info.find(&symbol)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.clone()))?
            .to_model()
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let symbol = symbol.to_uppercase();
        let ticker: TickerPriceResponse = self
            .public_get("/api/v3/ticker/price", &[("symbol", symbol.as_str())])
            .await?;
        ticker.to_model()
    }

    pub async fn get_account(&self) -> Result<AccountInformation, ExchangeError> {
        self.signed_request(Method::GET, "/api/v3/account", "omitZeroBalances=true")
            .await
    }

    pub async fn free_balance(&self, asset: &str) -> Result<Decimal, ExchangeError> {
        self.get_account().await?.free_balance(asset)
    }

    pub async fn post_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderConfirmation, ExchangeError> {
        let params = market_order_params(symbol, side, quantity);

        info!("Placing Order: {} {} {}", side, quantity.normalize(), symbol);

        let order: OrderResponse = self
            .signed_request(Method::POST, "/api/v3/order", &params)
            .await?;
        order.to_model()
    }
}

fn market_order_params(symbol: &str, side: Side, quantity: Decimal) -> String {
    format!(
        "symbol={}&side={}&type=MARKET&quantity={}&newOrderRespType=RESULT",
        symbol.to_uppercase(),
        side,
        quantity.normalize()
    )
}
