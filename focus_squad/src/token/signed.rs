use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;

use super::errors::TokenError;
use crate::utils::{base64url_decode, base64url_encode};

type HmacSha256 = Hmac<Sha256>;

fn new_mac(secret: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, so this cannot fail.
    <HmacSha256 as Mac>::new_from_slice(secret).unwrap_or_else(|_| unreachable!())
}

/// Raw HMAC-SHA256 of `data` under `secret`.
pub fn hmac_sha256(secret: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = new_mac(secret);
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Serializes `payload` to JSON and signs it.
pub fn sign_payload<T: Serialize>(payload: &T, secret: &[u8]) -> Result<String, TokenError> {
    let body = base64url_encode(&serde_json::to_vec(payload)?);
    let signature = base64url_encode(&hmac_sha256(secret, body.as_bytes()));
    Ok(format!("{body}.{signature}"))
}

/// Checks the signature of a token produced by [`sign_payload`] and returns its payload.
pub fn verify_payload<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, TokenError> {
    let (body, signature) = token
        .split_once('.')
        .ok_or_else(|| TokenError::Malformed("missing separator".to_string()))?;
    if body.is_empty() || signature.is_empty() || signature.contains('.') {
        return Err(TokenError::Malformed("unexpected token shape".to_string()));
    }

    let signature = base64url_decode(signature)
        .map_err(|_| TokenError::Malformed("signature is not base64url".to_string()))?;

    let mut mac = new_mac(secret);
    mac.update(body.as_bytes());
    mac.verify_slice(&signature).map_err(|_| {
        tracing::debug!("Signed payload rejected: signature mismatch");
        TokenError::InvalidSignature
    })?;

    let json = base64url_decode(body)
        .map_err(|_| TokenError::Malformed("body is not base64url".to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

/// A payload with an absolute expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedClaims<T> {
    pub exp: i64,
    #[serde(flatten)]
    pub data: T,
}

pub fn sign_claims<T: Serialize>(
    data: T,
    ttl_secs: i64,
    secret: &[u8],
) -> Result<String, TokenError> {
    let claims = SignedClaims {
        exp: Utc::now().timestamp() + ttl_secs,
        data,
    };
    sign_payload(&claims, secret)
}

/// Verifies signature and expiry, returning the inner data.
pub fn verify_claims<T: DeserializeOwned>(
    token: &str,
    secret: &[u8],
    now: i64,
) -> Result<T, TokenError> {
    let claims: SignedClaims<T> = verify_payload(token, secret)?;
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(claims.data)
}
