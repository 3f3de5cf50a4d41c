use crate::storage::GENERIC_DATA_STORE;
use crate::telegram::{errors::TelegramError, types::LiveStatus};

use super::postgres::*;
use super::sqlite::*;

pub(crate) struct LiveStatusStore;

impl LiveStatusStore {
    pub(crate) async fn init() -> Result<(), TelegramError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_live_status_table_sqlite(pool).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_live_status_table_postgres(pool).await
            }
            _ => Err(TelegramError::Storage(
                "Unsupported database type".to_string(),
            )),
        }
    }

    /// Status of `chat_id`, or of the most recently updated chat when `None`.
    pub(crate) async fn get(chat_id: Option<i64>) -> Result<Option<LiveStatus>, TelegramError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let row = if let Some(pool) = store.as_sqlite() {
            get_live_status_sqlite(pool, chat_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_live_status_postgres(pool, chat_id).await
        } else {
            Err(TelegramError::Storage(
                "Unsupported database type".to_string(),
            ))
        }?;

        row.map(LiveStatus::try_from)
            .transpose()
            .map_err(TelegramError::Storage)
    }

    #[tracing::instrument(skip(status), fields(chat_id = status.chat_id, status = %status.status))]
    pub(crate) async fn upsert(status: &LiveStatus) -> Result<(), TelegramError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            upsert_live_status_sqlite(pool, status).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_live_status_postgres(pool, status).await
        } else {
            Err(TelegramError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}
