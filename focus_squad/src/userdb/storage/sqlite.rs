use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::super::config::DB_TABLE_USERS;

pub(super) async fn ensure_users_table_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let users = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {users} (
            sequence_number INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT false,
            is_blocked BOOLEAN NOT NULL DEFAULT false,
            telegram_user_id INTEGER,
            telegram_username TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn check_users_schema_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let expected_columns = [
        ("sequence_number", "INTEGER"),
        ("id", "TEXT"),
        ("email", "TEXT"),
        ("label", "TEXT"),
        ("is_admin", "BOOLEAN"),
        ("is_blocked", "BOOLEAN"),
        ("telegram_user_id", "INTEGER"),
        ("telegram_username", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        DB_TABLE_USERS.as_str(),
        &expected_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn list_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    ensure_users_table_sqlite(pool).await?;

    let users = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {users} ORDER BY sequence_number ASC"
    ))
    .fetch_all(pool)
    .await?)
}

pub(super) async fn find_user_sqlite(
    pool: &Pool<Sqlite>,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    ensure_users_table_sqlite(pool).await?;

    let users = DB_TABLE_USERS.as_str();

    let user = match field {
        UserSearchField::Id(id) => {
            sqlx::query_as::<_, User>(&format!("SELECT * FROM {users} WHERE id = ?"))
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        UserSearchField::Email(email) => {
            sqlx::query_as::<_, User>(&format!("SELECT * FROM {users} WHERE email = ?"))
                .bind(email)
                .fetch_optional(pool)
                .await?
        }
        UserSearchField::TelegramUserId(tg_id) => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT * FROM {users} WHERE telegram_user_id = ? ORDER BY sequence_number ASC LIMIT 1"
            ))
            .bind(tg_id)
            .fetch_optional(pool)
            .await?
        }
    };

    Ok(user)
}

pub(super) async fn save_user_sqlite(pool: &Pool<Sqlite>, user: User) -> Result<User, UserError> {
    ensure_users_table_sqlite(pool).await?;

    let users = DB_TABLE_USERS.as_str();
    let now = chrono::Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {users}
            (id, email, label, is_admin, is_blocked, telegram_user_id, telegram_username, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            email = excluded.email,
            label = excluded.label,
            is_admin = excluded.is_admin,
            is_blocked = excluded.is_blocked,
            telegram_user_id = excluded.telegram_user_id,
            telegram_username = excluded.telegram_username,
            updated_at = excluded.updated_at
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
    .execute(pool)
    .await?;

    Ok(
        sqlx::query_as::<_, User>(&format!("SELECT * FROM {users} WHERE id = ?"))
            .bind(&user.id)
            .fetch_one(pool)
            .await?,
    )
}

pub(super) async fn remove_user_sqlite(pool: &Pool<Sqlite>, id: &str) -> Result<(), UserError> {
    ensure_users_table_sqlite(pool).await?;

    let users = DB_TABLE_USERS.as_str();

    sqlx::query(&format!("DELETE FROM {users} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
