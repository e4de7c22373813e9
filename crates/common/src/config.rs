use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BINANCE_BASE_URL: &str = "https://api.binance.com";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_RECV_WINDOW_MS: u64 = 5000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub recv_window_ms: u64,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
    pub timeout: Duration,
}

#[derive(Clone, PartialEq, Eq)]
pub struct WebhookCredentials {
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for WebhookCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Process configuration. Every capability whose settings are missing is
/// `None` and runs degraded instead of aborting startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub exchange: Option<ExchangeConfig>,
    pub telegram: Option<TelegramConfig>,
    pub credentials: Option<WebhookCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let exchange = match (get("BINANCE_API_KEY"), get("BINANCE_SECRET_KEY")) {
            (Some(api_key), Some(secret_key)) => Some(ExchangeConfig {
                api_key,
                secret_key,
                base_url: get("BINANCE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BINANCE_BASE_URL.to_string()),
                recv_window_ms: parse_or(&get, "BINANCE_RECV_WINDOW", DEFAULT_RECV_WINDOW_MS),
                http_timeout: Duration::from_secs(parse_or(
                    &get,
                    "HTTP_TIMEOUT_SECS",
                    DEFAULT_HTTP_TIMEOUT_SECS,
                )),
            }),
            _ => {
                warn!("BINANCE_API_KEY/BINANCE_SECRET_KEY not set, trading is disabled");
                None
            }
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => match chat_id.trim().parse::<i64>() {
                Ok(chat_id) => Some(TelegramConfig {
                    bot_token,
                    chat_id,
                    timeout: Duration::from_secs(parse_or(
                        &get,
                        "NOTIFY_TIMEOUT_SECS",
                        DEFAULT_NOTIFY_TIMEOUT_SECS,
                    )),
                }),
                Err(_) => {
                    warn!("TELEGRAM_CHAT_ID must be a number, notifications are disabled");
                    None
                }
            },
            _ => {
                warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, notifications are disabled");
                None
            }
        };

        let credentials = match (get("WEBHOOK_USERNAME"), get("WEBHOOK_PASSWORD")) {
            (Some(username), Some(password)) => Some(WebhookCredentials { username, password }),
            _ => {
                warn!("WEBHOOK_USERNAME/WEBHOOK_PASSWORD not set, every webhook will be rejected");
                None
            }
        };

        Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, "PORT", DEFAULT_PORT),
            exchange,
            telegram,
            credentials,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_degrades_everything() {
        let config = config_from(&[]);

        assert!(config.exchange.is_none());
        assert!(config.telegram.is_none());
        assert!(config.credentials.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:10000");
    }

    #[test]
    fn full_environment_is_loaded() {
        let config = config_from(&[
            ("BINANCE_API_KEY", "key"),
            ("BINANCE_SECRET_KEY", "secret"),
            ("BINANCE_BASE_URL", "https://testnet.binance.vision"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
            ("NOTIFY_TIMEOUT_SECS", "2"),
            ("WEBHOOK_USERNAME", "tv"),
            ("WEBHOOK_PASSWORD", "hunter2"),
            ("PORT", "8080"),
        ]);

        let exchange = config.exchange.unwrap();
        assert_eq!(exchange.base_url, "https://testnet.binance.vision");
        assert_eq!(exchange.recv_window_ms, 5000);

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.chat_id, -100200300);
        assert_eq!(telegram.timeout, Duration::from_secs(2));

        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.username, "tv");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn bad_values_fall_back_or_disable() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "not-a-number"),
            ("PORT", "eighty"),
            ("WEBHOOK_USERNAME", "tv"),
            ("WEBHOOK_PASSWORD", "  "),
        ]);

        assert!(config.telegram.is_none());
        assert!(config.credentials.is_none());
        assert_eq!(config.port, 10000);
    }

    #[test]
    fn password_is_not_printed() {
        let credentials = WebhookCredentials {
            username: "tv".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
