use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::super::config::DB_TABLE_USERS;

pub(super) async fn ensure_users_table_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let users = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {users} (
            sequence_number BIGSERIAL PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            is_blocked BOOLEAN NOT NULL DEFAULT FALSE,
            telegram_user_id BIGINT,
            telegram_username TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn check_users_schema_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let expected_columns = [
        ("sequence_number", "bigint"),
        ("id", "text"),
        ("email", "text"),
        ("label", "text"),
        ("is_admin", "boolean"),
        ("is_blocked", "boolean"),
        ("telegram_user_id", "bigint"),
        ("telegram_username", "text"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_USERS.as_str(),
        &expected_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn list_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let users = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {users} ORDER BY sequence_number ASC"
    ))
    .fetch_all(pool)
    .await?)
}

pub(super) async fn find_user_postgres(
    pool: &Pool<Postgres>,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    let users = DB_TABLE_USERS.as_str();

    let user = match field {
        UserSearchField::Id(id) => {
            sqlx::query_as::<_, User>(&format!("SELECT * FROM {users} WHERE id = $1"))
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        UserSearchField::Email(email) => {
            sqlx::query_as::<_, User>(&format!("SELECT * FROM {users} WHERE email = $1"))
                .bind(email)
                .fetch_optional(pool)
                .await?
        }
        UserSearchField::TelegramUserId(tg_id) => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT * FROM {users} WHERE telegram_user_id = $1 ORDER BY sequence_number ASC LIMIT 1"
            ))
            .bind(tg_id)
            .fetch_optional(pool)
            .await?
        }
    };

    Ok(user)
}

pub(super) async fn save_user_postgres(
    pool: &Pool<Postgres>,
    user: User,
) -> Result<User, UserError> {
    let users = DB_TABLE_USERS.as_str();
    let now = chrono::Utc::now();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {users}
            (id, email, label, is_admin, is_blocked, telegram_user_id, telegram_username, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            label = EXCLUDED.label,
            is_admin = EXCLUDED.is_admin,
            is_blocked = EXCLUDED.is_blocked,
            telegram_user_id = EXCLUDED.telegram_user_id,
            telegram_username = EXCLUDED.telegram_username,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#
    ))
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.label)
    .bind(user.is_admin)
    .bind(user.is_blocked)
    .bind(user.telegram_user_id)
    .bind(&user.telegram_username)
    .bind(user.created_at)
    .bind(now)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn remove_user_postgres(pool: &Pool<Postgres>, id: &str) -> Result<(), UserError> {
    let users = DB_TABLE_USERS.as_str();

    sqlx::query(&format!("DELETE FROM {users} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
