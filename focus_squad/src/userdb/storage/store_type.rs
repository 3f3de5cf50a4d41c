use crate::storage::GENERIC_DATA_STORE;
use crate::userdb::{
    config::is_allowlisted_admin,
    errors::UserError,
    types::{User, UserSearchField, normalize_email},
};

use super::postgres::*;
use super::sqlite::*;

pub(crate) struct UserStore;

fn no_backend() -> UserError {
    UserError::Storage("Data store has neither a SQLite nor a Postgres pool".to_string())
}

impl UserStore {
    /// Creates the users table if needed and checks its columns.
    pub(crate) async fn init() -> Result<(), UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                ensure_users_table_sqlite(pool).await?;
                check_users_schema_sqlite(pool).await
            }
            (_, Some(pool)) => {
                ensure_users_table_postgres(pool).await?;
                check_users_schema_postgres(pool).await
            }
            _ => Err(no_backend()),
        }
    }

    pub(crate) async fn get_all_users() -> Result<Vec<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            list_users_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            list_users_postgres(pool).await
        } else {
            Err(no_backend())
        }
    }

    pub(crate) async fn get_user(id: &str) -> Result<Option<User>, UserError> {
        Self::get_user_by(UserSearchField::Id(id.to_string())).await
    }

    #[tracing::instrument(fields(lookup = %field))]
    pub(crate) async fn get_user_by(field: UserSearchField) -> Result<Option<User>, UserError> {
        let field = match field {
            UserSearchField::Email(email) => UserSearchField::Email(normalize_email(&email)),
            other => other,
        };

        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            find_user_sqlite(pool, &field).await
        } else if let Some(pool) = store.as_postgres() {
            find_user_postgres(pool, &field).await
        } else {
            Err(no_backend())
        };

        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "User lookup completed"),
            Err(e) => tracing::error!(error = %e, "User lookup failed"),
        }

        result
    }

    /// Create or update a user. Allowlisted emails always end up as admins.
    #[tracing::instrument(skip_all, fields(user_id = %user.id))]
    pub(crate) async fn upsert_user(mut user: User) -> Result<User, UserError> {
        user.email = normalize_email(&user.email);
        if user.email.is_empty() {
            return Err(UserError::InvalidData("email must not be empty".to_string()));
        }
        if !user.is_admin && is_allowlisted_admin(&user.email) {
            tracing::info!(user_id = %user.id, "Granting admin from allowlist");
            user.is_admin = true;
        }

        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            save_user_sqlite(pool, user).await
        } else if let Some(pool) = store.as_postgres() {
            save_user_postgres(pool, user).await
        } else {
            Err(no_backend())
        };

        match &result {
            Ok(user) => tracing::info!(
                user_id = %user.id,
                is_admin = user.is_admin,
                is_blocked = user.is_blocked,
                "User upsert completed"
            ),
            Err(e) => tracing::error!(error = %e, "User upsert failed"),
        }

        result
    }

    /// Returns the user owning `email`, creating it on first sign-in.
    pub(crate) async fn find_or_create_by_email(email: &str, label: &str) -> Result<User, UserError> {
        if let Some(user) = Self::get_user_by(UserSearchField::Email(email.to_string())).await? {
            // Re-apply the allowlist so a newly listed email is promoted on its next sign-in.
            if !user.is_admin && is_allowlisted_admin(&user.email) {
                return Self::upsert_user(user).await;
            }
            return Ok(user);
        }

        let label = if label.trim().is_empty() {
            normalize_email(email)
        } else {
            label.trim().to_string()
        };
        let user = User::new(uuid::Uuid::new_v4().to_string(), email, label);
        Self::upsert_user(user).await
    }

    pub(crate) async fn delete_user(id: &str) -> Result<(), UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            remove_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            remove_user_postgres(pool, id).await
        } else {
            Err(no_backend())
        }
    }
}
