//! HMAC-signed JSON payloads
//!
//! Tokens have the shape `base64url(json) "." base64url(hmac_sha256(secret, base64url(json)))`.

mod errors;
mod signed;

pub use errors::TokenError;
pub use signed::{SignedClaims, hmac_sha256, sign_claims, sign_payload, verify_claims, verify_payload};
