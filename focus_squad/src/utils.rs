use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Random bytes rendered as lowercase hex (`len` bytes, `2 * len` characters).
pub fn gen_random_hex(len: usize) -> Result<String, UtilError> {
    Ok(hex::encode(gen_random_bytes(len)?))
}

/// Attributes of a `Set-Cookie` header.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub http_only: bool,
    pub max_age: i64,
}

impl CookieOptions {
    pub fn http_only(max_age: i64) -> Self {
        Self {
            http_only: true,
            max_age,
        }
    }

    pub fn readable(max_age: i64) -> Self {
        Self {
            http_only: false,
            max_age,
        }
    }

    /// Options that make the browser drop the cookie immediately.
    pub fn expired() -> Self {
        Self {
            http_only: true,
            max_age: 0,
        }
    }
}

pub(crate) fn format_set_cookie(name: &str, value: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{name}={value}; SameSite=Lax; Secure; Path=/; Max-Age={}",
        options.max_age
    );
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie
}

pub fn header_set_cookie<'a>(
    headers: &'a mut HeaderMap,
    name: &str,
    value: &str,
    options: CookieOptions,
) -> Result<&'a HeaderMap, UtilError> {
    let cookie = format_set_cookie(name, value, options);
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(headers)
}

/// Finds a cookie value in the raw `Cookie` request headers.
pub fn get_cookie_from_headers<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .map(|s| s.trim())
        .find_map(|s| {
            let mut parts = s.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(k), Some(v)) if k == cookie_name => Some(v),
                _ => None,
            }
        })
}
