use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;

use super::errors::AdminGuardError;

type HmacSha256 = Hmac<Sha256>;

fn signing_input(timestamp: i64, method: &Method, path: &str) -> String {
    format!("{timestamp}.{}.{path}", method.as_str())
}

/// Header value authenticating a machine call: `t=<unix seconds>,v1=<hex hmac>`.
///
/// The MAC covers the timestamp, method and path, so a captured header is only
/// replayable against the same endpoint within the accepted age.
pub fn sign_internal_request(secret: &[u8], method: &Method, path: &str, now: i64) -> String {
    let mac = crate::token::hmac_sha256(secret, signing_input(now, method, path).as_bytes());
    format!("t={now},v1={}", hex::encode(mac))
}

/// Verifies a header produced by [`sign_internal_request`].
pub fn verify_internal_signature(
    header: &str,
    secret: &[u8],
    method: &Method,
    path: &str,
    now: i64,
    max_age_secs: i64,
) -> Result<(), AdminGuardError> {
    let (timestamp, signature) = parse_header(header).ok_or_else(|| {
        tracing::debug!("Malformed internal signature header");
        AdminGuardError::Unauthorized
    })?;

    let age = now.checked_sub(timestamp).map(i64::unsigned_abs);
    if age.is_none_or(|age| age > max_age_secs.unsigned_abs()) {
        tracing::warn!(timestamp, now, "Internal signature outside the accepted age");
        return Err(AdminGuardError::Unauthorized);
    }

    let signature = hex::decode(signature).map_err(|_| AdminGuardError::Unauthorized)?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| AdminGuardError::Unauthorized)?;
    mac.update(signing_input(timestamp, method, path).as_bytes());
    mac.verify_slice(&signature).map_err(|_| {
        tracing::warn!("Internal signature mismatch");
        AdminGuardError::Unauthorized
    })
}

fn parse_header(header: &str) -> Option<(i64, &str)> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    Some((timestamp?, signature?))
}
