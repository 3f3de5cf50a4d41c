//! Crate-wide configuration shared by several modules

use std::env;
use std::sync::LazyLock;

const DEFAULT_AUTH_SECRET: &str = "default_secret_key_change_in_production";

/// Key for signed payloads and internal admin signatures.
///
/// Read from `AUTH_SECRET`, falling back to `NEXTAUTH_SECRET` so deployments
/// that share the secret with the sign-in layer keep working.
pub static AUTH_SECRET: LazyLock<Vec<u8>> = LazyLock::new(|| {
    match env::var("AUTH_SECRET").or_else(|_| env::var("NEXTAUTH_SECRET")) {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            tracing::warn!("AUTH_SECRET is not set, using an insecure development secret");
            DEFAULT_AUTH_SECRET.as_bytes().to_vec()
        }
    }
});

/// Public base URL of the web application, used in links sent by the bot
pub static APP_BASE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("APP_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:3001".to_string())
});

pub static FS_SIGNIN_PATH: LazyLock<String> =
    LazyLock::new(|| env::var("FS_SIGNIN_PATH").unwrap_or_else(|_| "/auth/signin".to_string()));

pub static FS_SIGNOUT_PATH: LazyLock<String> =
    LazyLock::new(|| env::var("FS_SIGNOUT_PATH").unwrap_or_else(|_| "/auth/signout".to_string()));

pub static FS_LINK_PAGE_PATH: LazyLock<String> = LazyLock::new(|| {
    env::var("FS_LINK_PAGE_PATH").unwrap_or_else(|_| "/link-telegram".to_string())
});
