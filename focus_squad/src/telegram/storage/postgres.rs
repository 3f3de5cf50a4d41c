use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::telegram::{
    errors::TelegramError,
    types::{LiveStatus, LiveStatusRow},
};

use super::super::config::DB_TABLE_LIVE_STATUS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), TelegramError> {
    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            chat_id BIGINT PRIMARY KEY NOT NULL,
            status TEXT NOT NULL,
            scheduled_for TIMESTAMPTZ,
            started_at TIMESTAMPTZ,
            ended_at TIMESTAMPTZ,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_live_status_table_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), TelegramError> {
    let expected_columns = [
        ("chat_id", "bigint"),
        ("status", "text"),
        ("scheduled_for", "timestamp with time zone"),
        ("started_at", "timestamp with time zone"),
        ("ended_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_LIVE_STATUS.as_str(),
        &expected_columns,
        TelegramError::Storage,
    )
    .await
}

pub(super) async fn get_live_status_postgres(
    pool: &Pool<Postgres>,
    chat_id: Option<i64>,
) -> Result<Option<LiveStatusRow>, TelegramError> {
    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    let row = match chat_id {
        Some(chat_id) => {
            sqlx::query_as::<_, LiveStatusRow>(&format!(
                "SELECT * FROM {table_name} WHERE chat_id = $1"
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

pub(super) async fn upsert_live_status_postgres(
    pool: &Pool<Postgres>,
    status: &LiveStatus,
) -> Result<(), TelegramError> {
    let table_name = DB_TABLE_LIVE_STATUS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (chat_id, status, scheduled_for, started_at, ended_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (chat_id) DO UPDATE SET
            status = EXCLUDED.status,
            scheduled_for = EXCLUDED.scheduled_for,
            started_at = EXCLUDED.started_at,
            ended_at = EXCLUDED.ended_at,
            updated_at = EXCLUDED.updated_at
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
