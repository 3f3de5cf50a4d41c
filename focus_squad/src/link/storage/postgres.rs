use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::link::{errors::LinkError, types::LinkToken};
use crate::storage::validate_postgres_table_schema;

use super::super::config::DB_TABLE_LINK_TOKENS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            token TEXT PRIMARY KEY NOT NULL,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table_name}_email ON {table_name}(email)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_link_tables_postgres(pool: &Pool<Postgres>) -> Result<(), LinkError> {
    let expected_columns = [
        ("token", "text"),
        ("email", "text"),
        ("created_at", "timestamp with time zone"),
        ("expires_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_LINK_TOKENS.as_str(),
        &expected_columns,
        LinkError::Storage,
    )
    .await
}

pub(super) async fn insert_token_postgres(
    pool: &Pool<Postgres>,
    token: &LinkToken,
) -> Result<(), LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    sqlx::query(&format!(
        "INSERT INTO {table_name} (token, email, created_at, expires_at) VALUES ($1, $2, $3, $4)"
    ))
    .bind(&token.token)
    .bind(&token.email)
    .bind(token.created_at)
    .bind(token.expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn consume_token_postgres(
    pool: &Pool<Postgres>,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    Ok(sqlx::query_scalar(&format!(
        "DELETE FROM {table_name} WHERE token = $1 AND expires_at > $2 RETURNING email"
    ))
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn get_tokens_for_email_postgres(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Vec<LinkToken>, LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    Ok(sqlx::query_as::<_, LinkToken>(&format!(
        "SELECT * FROM {table_name} WHERE email = $1 ORDER BY created_at ASC"
    ))
    .bind(email)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn delete_tokens_for_email_postgres(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<u64, LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    let result = sqlx::query(&format!("DELETE FROM {table_name} WHERE email = $1"))
        .bind(email)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub(super) async fn purge_expired_postgres(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
) -> Result<u64, LinkError> {
    let table_name = DB_TABLE_LINK_TOKENS.as_str();

    let result = sqlx::query(&format!("DELETE FROM {table_name} WHERE expires_at <= $1"))
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
