use chrono::{DateTime, Utc};

use crate::link::{errors::LinkError, types::LinkToken};
use crate::storage::GENERIC_DATA_STORE;
use crate::userdb::normalize_email;

use super::postgres::*;
use super::sqlite::*;

pub(crate) struct LinkTokenStore;

impl LinkTokenStore {
    pub(crate) async fn init() -> Result<(), LinkError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_link_tables_sqlite(pool).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_link_tables_postgres(pool).await
            }
            _ => Err(LinkError::Storage("Unsupported database type".to_string())),
        }
    }

    #[tracing::instrument(skip(token), fields(expires_at = %token.expires_at))]
    pub(crate) async fn insert_token(token: &LinkToken) -> Result<(), LinkError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            insert_token_sqlite(pool, token).await
        } else if let Some(pool) = store.as_postgres() {
            insert_token_postgres(pool, token).await
        } else {
            Err(LinkError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Deletes an unexpired token and returns its email, in one statement.
    ///
    /// Of any number of concurrent calls for the same token, at most one gets `Some`.
    pub(crate) async fn consume_token(
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, LinkError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let consumed = if let Some(pool) = store.as_sqlite() {
            consume_token_sqlite(pool, token, now).await
        } else if let Some(pool) = store.as_postgres() {
            consume_token_postgres(pool, token, now).await
        } else {
            Err(LinkError::Storage("Unsupported database type".to_string()))
        }?;

        tracing::debug!(consumed = consumed.is_some(), "Link token consumption");
        Ok(consumed)
    }

    pub(crate) async fn get_tokens_for_email(email: &str) -> Result<Vec<LinkToken>, LinkError> {
        let email = normalize_email(email);
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_tokens_for_email_sqlite(pool, &email).await
        } else if let Some(pool) = store.as_postgres() {
            get_tokens_for_email_postgres(pool, &email).await
        } else {
            Err(LinkError::Storage("Unsupported database type".to_string()))
        }
    }

    pub(crate) async fn delete_tokens_for_email(email: &str) -> Result<u64, LinkError> {
        let email = normalize_email(email);
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_tokens_for_email_sqlite(pool, &email).await
        } else if let Some(pool) = store.as_postgres() {
            delete_tokens_for_email_postgres(pool, &email).await
        } else {
            Err(LinkError::Storage("Unsupported database type".to_string()))
        }
    }

    pub(crate) async fn purge_expired(now: DateTime<Utc>) -> Result<u64, LinkError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let purged = if let Some(pool) = store.as_sqlite() {
            purge_expired_sqlite(pool, now).await
        } else if let Some(pool) = store.as_postgres() {
            purge_expired_postgres(pool, now).await
        } else {
            Err(LinkError::Storage("Unsupported database type".to_string()))
        }?;

        if purged > 0 {
            tracing::debug!(purged, "Purged expired link tokens");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, unique_email};
    use crate::utils::gen_random_hex;
    use chrono::Duration;
    use serial_test::serial;

    fn token_for(email: &str, expires_in: Duration) -> LinkToken {
        let now = Utc::now();
        LinkToken {
            token: gen_random_hex(16).unwrap(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_consume_returns_email_once() {
        init_test_environment().await;
        let email = unique_email("consume");
        let token = token_for(&email, Duration::minutes(10));
        LinkTokenStore::insert_token(&token).await.unwrap();

        let first = LinkTokenStore::consume_token(&token.token, Utc::now())
            .await
            .unwrap();
        let second = LinkTokenStore::consume_token(&token.token, Utc::now())
            .await
            .unwrap();

        assert_eq!(first.as_deref(), Some(email.as_str()));
        assert_eq!(second, None);
    }

    #[tokio::test]
    #[serial]
    async fn test_expired_token_is_not_consumed() {
        init_test_environment().await;
        let email = unique_email("expired");
        let token = token_for(&email, Duration::minutes(10));
        LinkTokenStore::insert_token(&token).await.unwrap();

        let later = Utc::now() + Duration::minutes(11);
        let consumed = LinkTokenStore::consume_token(&token.token, later)
            .await
            .unwrap();

        assert_eq!(consumed, None);
    }

    #[tokio::test]
    #[serial]
    async fn test_concurrent_consumption_succeeds_once() {
        init_test_environment().await;
        let email = unique_email("race");
        let token = token_for(&email, Duration::minutes(10));
        LinkTokenStore::insert_token(&token).await.unwrap();

        let code_a = token.token.clone();
        let code_b = token.token.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { LinkTokenStore::consume_token(&code_a, Utc::now()).await }),
            tokio::spawn(async move { LinkTokenStore::consume_token(&code_b, Utc::now()).await }),
        );

        let successes = [a.unwrap().unwrap(), b.unwrap().unwrap()]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_purge_expired_keeps_live_tokens() {
        init_test_environment().await;
        let email = unique_email("purge");
        let live = token_for(&email, Duration::minutes(10));
        let dead = token_for(&email, Duration::minutes(-1));
        LinkTokenStore::insert_token(&live).await.unwrap();
        LinkTokenStore::insert_token(&dead).await.unwrap();

        let purged = LinkTokenStore::purge_expired(Utc::now()).await.unwrap();

        assert!(purged >= 1);
        let remaining = LinkTokenStore::get_tokens_for_email(&email).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, live.token);
    }

    #[tokio::test]
    #[serial]
    async fn test_delete_tokens_for_email() {
        init_test_environment().await;
        let email = unique_email("wipe");
        LinkTokenStore::insert_token(&token_for(&email, Duration::minutes(5)))
            .await
            .unwrap();
        LinkTokenStore::insert_token(&token_for(&email, Duration::minutes(5)))
            .await
            .unwrap();

        let deleted = LinkTokenStore::delete_tokens_for_email(&email.to_uppercase())
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert!(LinkTokenStore::get_tokens_for_email(&email).await.unwrap().is_empty());
    }
}
