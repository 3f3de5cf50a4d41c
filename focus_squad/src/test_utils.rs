//! Test utilities module for shared test initialization and helpers
//!
//! Every test that touches the global stores calls [`init_test_environment`]
//! first. It points the data store at a throwaway SQLite file and the cache
//! store at the in-memory implementation before either is first used.

use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};

/// Secret used for signed payloads and internal signatures in tests
pub const TEST_AUTH_SECRET: &str = "focus-squad-test-secret";

/// Email that `ADMIN_EMAILS` grants admin rights to in tests
pub const TEST_ADMIN_EMAIL: &str = "coach@focus-squad.test";

pub async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        let db_path = std::env::temp_dir().join(format!(
            "focus_squad_test_{}.db",
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
        ];
        for (key, value) in defaults {
            if std::env::var(key).is_err() {
                // Tests run before any store is touched, so nothing reads these concurrently.
                unsafe { std::env::set_var(key, value) };
            }
        }
    });

    if let Err(e) = crate::init().await {
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
