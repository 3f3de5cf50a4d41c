//! Shared test setup for the router and middleware tests
//!
//! Points the core stores at a throwaway SQLite file and the in-memory cache
//! before anything touches them, and provides sign-in and bot helpers.

use std::sync::{Arc, Mutex, Once};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use http::header::SET_COOKIE;

use focus_squad::{BotApi, OutgoingMessage, SessionUser, TelegramError, create_session_for_account};

/// Email that `ADMIN_EMAILS` grants admin rights to in tests
pub const TEST_ADMIN_EMAIL: &str = "coach@focus-squad.test";

pub const TEST_AUTH_SECRET: &str = "focus-squad-axum-test-secret";

pub const TEST_WEBHOOK_SECRET: &str = "webhook-test-secret";

pub async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        let db_path = std::env::temp_dir().join(format!(
            "focus_squad_axum_test_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&db_path);
        let db_url = format!("sqlite:{}", db_path.display());

        let defaults = [
            ("GENERIC_DATA_STORE_TYPE", "sqlite".to_string()),
            ("GENERIC_DATA_STORE_URL", db_url),
            ("GENERIC_CACHE_STORE_TYPE", "memory".to_string()),
            ("GENERIC_CACHE_STORE_URL", "memory".to_string()),
            ("AUTH_SECRET", TEST_AUTH_SECRET.to_string()),
            ("ADMIN_EMAILS", TEST_ADMIN_EMAIL.to_string()),
            ("TELEGRAM_BOT_USERNAME", "FocusSquadTestBot".to_string()),
            ("TELEGRAM_WEBHOOK_SECRET", TEST_WEBHOOK_SECRET.to_string()),
            ("RATE_LIMIT_MAX_REQUESTS", "100000".to_string()),
        ];
        for (key, value) in defaults {
            if std::env::var(key).is_err() {
                // Runs before any store or config static is first read.
                unsafe { std::env::set_var(key, value) };
            }
        }
    });

    if let Err(e) = focus_squad::init().await {
        eprintln!("Warning: Failed to initialize stores: {e}");
    }
}

/// An email address that no other test uses
pub fn unique_email(tag: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{tag}-{}-{n}@focus-squad.test",
        chrono::Utc::now().timestamp_millis()
    )
}

/// Signs `email` in and returns the user with a `Cookie` header value carrying its session.
pub async fn sign_in(email: &str) -> (SessionUser, String) {
    let (user, headers) = create_session_for_account(email, "Learner")
        .await
        .expect("sign in");
    (user, cookie_from_set_cookie(&headers))
}

/// Turns `Set-Cookie` headers into a single `Cookie` header value.
pub fn cookie_from_set_cookie(headers: &http::HeaderMap) -> String {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot that records outgoing messages instead of calling Telegram
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingBot {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotApi for RecordingBot {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// The API router mounted the way applications mount it
pub fn test_api(bot: Arc<dyn BotApi>) -> axum::Router {
    axum::Router::new().nest("/api", crate::focus_squad_router_with_bot(bot))
}
