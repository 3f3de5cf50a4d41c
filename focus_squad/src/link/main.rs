use chrono::{Duration, Utc};

use crate::config::{APP_BASE_URL, AUTH_SECRET, FS_LINK_PAGE_PATH};
use crate::session::User as SessionUser;
use crate::token::{sign_claims, verify_claims};
use crate::userdb::{User, UserSearchField, UserStore};
use crate::utils::gen_random_hex;

use super::config::{
    BOT_LINK_TOKEN_TTL_SECS, LINK_TOKEN_BYTES, LINK_TOKEN_TTL_SECS, TELEGRAM_BOT_USERNAME,
};
use super::errors::LinkError;
use super::storage::LinkTokenStore;
use super::types::{LinkInvite, LinkToken, TelegramIdentity};

/// Issues a one-time link code for the signed-in user and the bot deep link carrying it.
#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub async fn create_link_for_user(user: &SessionUser) -> Result<LinkInvite, LinkError> {
    let now = Utc::now();

    if let Err(e) = LinkTokenStore::purge_expired(now).await {
        tracing::warn!(error = %e, "Failed to purge expired link tokens");
    }

    let token = LinkToken {
        token: gen_random_hex(LINK_TOKEN_BYTES)?,
        email: user.email.clone(),
        created_at: now,
        expires_at: now + Duration::seconds(*LINK_TOKEN_TTL_SECS),
    };
    LinkTokenStore::insert_token(&token).await?;

    tracing::info!("Link code issued");
    Ok(LinkInvite {
        deep_link: format!(
            "https://t.me/{}?start={}",
            TELEGRAM_BOT_USERNAME.as_str(),
            token.token
        ),
        code: token.token,
        expires_at: token.expires_at,
    })
}

/// Consumes a link code received by the bot and binds `identity` to its owner.
///
/// Unknown, expired and already used codes all yield [`LinkError::InvalidOrExpired`].
#[tracing::instrument(skip(code), fields(telegram_user_id = identity.telegram_user_id))]
pub async fn consume_link_code(code: &str, identity: &TelegramIdentity) -> Result<User, LinkError> {
    let email = LinkTokenStore::consume_token(code.trim(), Utc::now())
        .await?
        .ok_or(LinkError::InvalidOrExpired)?;

    let user = UserStore::get_user_by(UserSearchField::Email(email))
        .await?
        .ok_or(LinkError::UserNotFound)?;

    bind_telegram(user, identity).await
}

/// Link page URL carrying a signed, short-lived copy of `identity`.
///
/// Sent by the bot to Telegram users who start a conversation without a code.
pub fn create_bot_link_url(identity: &TelegramIdentity) -> Result<String, LinkError> {
    let token = sign_claims(identity, BOT_LINK_TOKEN_TTL_SECS, &AUTH_SECRET)?;
    Ok(format!(
        "{}{}?t={}",
        APP_BASE_URL.as_str(),
        FS_LINK_PAGE_PATH.as_str(),
        urlencoding::encode(&token)
    ))
}

/// Binds the Telegram account in a bot-issued token to the signed-in user.
#[tracing::instrument(skip(token))]
pub async fn confirm_bot_link(user_id: &str, token: &str) -> Result<User, LinkError> {
    let identity: TelegramIdentity =
        verify_claims(token, &AUTH_SECRET, Utc::now().timestamp()).inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected bot link token");
        })?;

    let user = UserStore::get_user(user_id)
        .await?
        .ok_or(LinkError::UserNotFound)?;

    bind_telegram(user, &identity).await
}

pub async fn unlink_telegram(user_id: &str) -> Result<User, LinkError> {
    let user = UserStore::get_user(user_id)
        .await?
        .ok_or(LinkError::UserNotFound)?;

    let user = UserStore::upsert_user(User {
        telegram_user_id: None,
        telegram_username: None,
        ..user
    })
    .await?;

    tracing::info!(user_id = %user.id, "Telegram account unlinked");
    Ok(user)
}

async fn bind_telegram(user: User, identity: &TelegramIdentity) -> Result<User, LinkError> {
    let user = UserStore::upsert_user(User {
        telegram_user_id: Some(identity.telegram_user_id),
        telegram_username: identity.telegram_username.clone(),
        ..user
    })
    .await?;

    tracing::info!(
        user_id = %user.id,
        telegram_user_id = identity.telegram_user_id,
        "Telegram account linked"
    );
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_environment, unique_email};
    use crate::token::{TokenError, sign_payload};
    use serial_test::serial;

    fn identity(id: i64) -> TelegramIdentity {
        TelegramIdentity {
            telegram_user_id: id,
            telegram_username: Some(format!("learner{id}")),
        }
    }

    async fn session_user(tag: &str) -> SessionUser {
        let user = UserStore::find_or_create_by_email(&unique_email(tag), "Learner")
            .await
            .unwrap();
        SessionUser::from(user)
    }

    #[tokio::test]
    #[serial]
    async fn test_create_link_returns_deep_link() {
        init_test_environment().await;
        let user = session_user("invite").await;

        let invite = create_link_for_user(&user).await.unwrap();

        assert_eq!(invite.code.len(), 32);
        assert_eq!(
            invite.deep_link,
            format!("https://t.me/FocusSquadTestBot?start={}", invite.code)
        );
        assert!(invite.expires_at > Utc::now());
        let stored = LinkTokenStore::get_tokens_for_email(&user.email).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_consume_link_code_binds_once() {
        init_test_environment().await;
        let user = session_user("bind").await;
        let invite = create_link_for_user(&user).await.unwrap();

        let linked = consume_link_code(&invite.code, &identity(4242)).await.unwrap();
        let again = consume_link_code(&invite.code, &identity(4242)).await;

        assert_eq!(linked.id, user.id);
        assert_eq!(linked.telegram_user_id, Some(4242));
        assert_eq!(linked.telegram_username.as_deref(), Some("learner4242"));
        assert!(matches!(again, Err(LinkError::InvalidOrExpired)));
    }

    #[tokio::test]
    #[serial]
    async fn test_consume_unknown_code() {
        init_test_environment().await;

        let result = consume_link_code("0123456789abcdef", &identity(1)).await;

        assert!(matches!(result, Err(LinkError::InvalidOrExpired)));
    }

    #[tokio::test]
    #[serial]
    async fn test_bot_link_url_confirms_for_signed_in_user() {
        init_test_environment().await;
        let user = session_user("bot-flow").await;

        let url = create_bot_link_url(&identity(777)).unwrap();
        let prefix = format!("{}{}?t=", APP_BASE_URL.as_str(), FS_LINK_PAGE_PATH.as_str());
        assert!(url.starts_with(&prefix));

        let token = urlencoding::decode(&url[prefix.len()..]).unwrap().into_owned();
        let linked = confirm_bot_link(&user.id, &token).await.unwrap();

        assert_eq!(linked.telegram_user_id, Some(777));
    }

    #[tokio::test]
    #[serial]
    async fn test_confirm_rejects_forged_and_expired_tokens() {
        init_test_environment().await;
        let user = session_user("forged").await;

        let forged = sign_claims(identity(9), 600, b"someone-else").unwrap();
        assert!(matches!(
            confirm_bot_link(&user.id, &forged).await,
            Err(LinkError::Token(TokenError::InvalidSignature))
        ));

        let expired = sign_payload(
            &serde_json::json!({"exp": Utc::now().timestamp() - 1, "telegram_user_id": 9, "telegram_username": null}),
            &AUTH_SECRET,
        )
        .unwrap();
        assert!(matches!(
            confirm_bot_link(&user.id, &expired).await,
            Err(LinkError::Token(TokenError::Expired))
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_unlink_clears_telegram_fields() {
        init_test_environment().await;
        let user = session_user("unlink").await;
        let invite = create_link_for_user(&user).await.unwrap();
        consume_link_code(&invite.code, &identity(31337)).await.unwrap();

        let unlinked = unlink_telegram(&user.id).await.unwrap();

        assert!(!unlinked.is_telegram_linked());
        assert!(unlinked.telegram_username.is_none());
    }
}
