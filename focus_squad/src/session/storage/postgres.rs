use sqlx::{Pool, Postgres};

use crate::session::errors::SessionError;
use crate::storage::validate_postgres_table_schema;

use super::store_type::DB_TABLE_APP_STATE;

pub(super) async fn create_tables_postgres(
    pool: &Pool<Postgres>,
    seed: i64,
) -> Result<(), SessionError> {
    let table_name = DB_TABLE_APP_STATE.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            session_version BIGINT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        "INSERT INTO {table_name} (id, session_version, updated_at) VALUES (1, $1, $2) ON CONFLICT (id) DO NOTHING"
    ))
    .bind(seed)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_app_state_table_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), SessionError> {
    let expected_columns = [
        ("id", "integer"),
        ("session_version", "bigint"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_APP_STATE.as_str(),
        &expected_columns,
        SessionError::Storage,
    )
    .await
}

pub(super) async fn get_session_version_postgres(pool: &Pool<Postgres>) -> Result<i64, SessionError> {
    let table_name = DB_TABLE_APP_STATE.as_str();

    sqlx::query_scalar(&format!("SELECT session_version FROM {table_name} WHERE id = 1"))
        .fetch_one(pool)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}

pub(super) async fn bump_session_version_postgres(
    pool: &Pool<Postgres>,
) -> Result<i64, SessionError> {
    let table_name = DB_TABLE_APP_STATE.as_str();

    sqlx::query_scalar(&format!(
        r#"
        UPDATE {table_name}
        SET session_version = session_version + 1, updated_at = $1
        WHERE id = 1
        RETURNING session_version
        "#
    ))
    .bind(chrono::Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| SessionError::Storage(e.to_string()))
}
