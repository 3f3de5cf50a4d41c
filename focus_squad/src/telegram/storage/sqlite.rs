use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::telegram::{
    errors::TelegramError,
    types::{LiveStatus, LiveStatusRow},
};

use super::super::config::DB_TABLE_LIVE_STATUS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), TelegramError> {
    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            chat_id INTEGER PRIMARY KEY NOT NULL,
            status TEXT NOT NULL,
            scheduled_for TIMESTAMP,
            started_at TIMESTAMP,
            ended_at TIMESTAMP,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_live_status_table_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), TelegramError> {
    let expected_columns = [
        ("chat_id", "INTEGER"),
        ("status", "TEXT"),
        ("scheduled_for", "TIMESTAMP"),
        ("started_at", "TIMESTAMP"),
        ("ended_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        DB_TABLE_LIVE_STATUS.as_str(),
        &expected_columns,
        TelegramError::Storage,
    )
    .await
}

pub(super) async fn get_live_status_sqlite(
    pool: &Pool<Sqlite>,
    chat_id: Option<i64>,
) -> Result<Option<LiveStatusRow>, TelegramError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    let row = match chat_id {
        Some(chat_id) => {
            sqlx::query_as::<_, LiveStatusRow>(&format!(
                "SELECT * FROM {table_name} WHERE chat_id = ?"
            ))
            .bind(chat_id)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, LiveStatusRow>(&format!(
                "SELECT * FROM {table_name} ORDER BY updated_at DESC LIMIT 1"
            ))
            .fetch_optional(pool)
            .await?
        }
    };

    Ok(row)
}

pub(super) async fn upsert_live_status_sqlite(
    pool: &Pool<Sqlite>,
    status: &LiveStatus,
) -> Result<(), TelegramError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (chat_id, status, scheduled_for, started_at, ended_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (chat_id) DO UPDATE SET
            status = excluded.status,
            scheduled_for = excluded.scheduled_for,
            started_at = excluded.started_at,
            ended_at = excluded.ended_at,
            updated_at = excluded.updated_at
        "#
    ))
    .bind(status.chat_id)
    .bind(status.status.as_str())
    .bind(status.scheduled_for)
    .bind(status.started_at)
    .bind(status.ended_at)
    .bind(status.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}
