use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Binance rejected request (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Unknown symbol: {0}")]
    SymbolNotFound(String),
    #[error("Symbol {0} has no LOT_SIZE filter")]
    MissingFilter(String),
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

impl ExchangeError {
    /// Builds an `Api` error from a non-2xx response body. Binance answers
    /// with `{"code":-1121,"msg":"Invalid symbol."}`; anything else is kept verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<BinanceErrorBody>(body) {
            Ok(err) => Self::Api {
                status,
                code: err.code,
                message: err.msg,
            },
            Err(_) => Self::Api {
                status,
                code: 0,
                message: body.trim().to_string(),
            },
        }
    }

    /// The exchange could not be reached or failed on its side (5xx), as
    /// opposed to answering that the request itself is wrong.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn decode(what: &str, value: &str) -> Self {
        Self::Decode(format!("{} is not a decimal: '{}'", what, value))
    }
}
