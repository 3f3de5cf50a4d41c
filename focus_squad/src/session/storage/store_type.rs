use std::sync::LazyLock;

use crate::session::config::SESSION_VERSION_SEED;
use crate::session::errors::SessionError;
use crate::storage::{DB_TABLE_PREFIX, GENERIC_DATA_STORE};

use super::postgres::*;
use super::sqlite::*;

pub(super) static DB_TABLE_APP_STATE: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", *DB_TABLE_PREFIX, "app_state"));

/// Single-row table holding the global session version
pub(crate) struct AppStateStore;

impl AppStateStore {
    pub(crate) async fn init() -> Result<(), SessionError> {
        let store = GENERIC_DATA_STORE.lock().await;
        let seed = *SESSION_VERSION_SEED;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool, seed).await?;
                validate_app_state_table_sqlite(pool).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool, seed).await?;
                validate_app_state_table_postgres(pool).await
            }
            _ => Err(SessionError::Storage("Unsupported database type".to_string())),
        }
    }

    pub(crate) async fn get_session_version() -> Result<i64, SessionError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_session_version_sqlite(pool, *SESSION_VERSION_SEED).await
        } else if let Some(pool) = store.as_postgres() {
            get_session_version_postgres(pool).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Atomically increments the session version and returns the new value.
    #[tracing::instrument]
    pub(crate) async fn bump_session_version() -> Result<i64, SessionError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let version = if let Some(pool) = store.as_sqlite() {
            bump_session_version_sqlite(pool, *SESSION_VERSION_SEED).await
        } else if let Some(pool) = store.as_postgres() {
            bump_session_version_postgres(pool).await
        } else {
            Err(SessionError::Storage("Unsupported database type".to_string()))
        }?;

        tracing::info!(session_version = version, "Global session version bumped");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_init_keeps_existing_version() {
        init_test_environment().await;
        let before = AppStateStore::get_session_version().await.unwrap();

        AppStateStore::init().await.unwrap();

        assert!(before >= 1);
        assert_eq!(AppStateStore::get_session_version().await.unwrap(), before);
    }
}
