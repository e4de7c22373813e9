use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::{Engine, engine::general_purpose::STANDARD};
use common::config::WebhookCredentials;

use crate::webhook::types::WebhookError;

/// Credentials carried by the `Authorization: Basic` header.
/// `None` when the header is absent, `Err` when it is present but unusable.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Result<(String, String), WebhookError>> {
    let value = headers.get(AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(parse_basic)
            .ok_or(WebhookError::Unauthorized),
    )
}

fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Exact, case-sensitive match against the configured credentials. Without
/// configured credentials nothing is accepted.
pub fn verify(
    expected: Option<&WebhookCredentials>,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<(), WebhookError> {
    let (Some(expected), Some(username), Some(password)) = (expected, username, password) else {
        return Err(WebhookError::Unauthorized);
    };

    // Evaluate both so timing does not reveal which one failed
    let user_ok = constant_time_eq(username.as_bytes(), expected.username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), expected.password.as_bytes());

    if user_ok & pass_ok {
        Ok(())
    } else {
        Err(WebhookError::Unauthorized)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
