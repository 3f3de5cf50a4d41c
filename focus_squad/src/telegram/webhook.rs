use chrono::{DateTime, Utc};

use crate::csrf::safe_equal;
use crate::link::{
    LinkError, TELEGRAM_BOT_USERNAME, TelegramIdentity, consume_link_code, create_bot_link_url,
};
use crate::userdb::{UserSearchField, UserStore};

use super::bot::{BotApi, OutgoingMessage};
use super::command::parse_command;
use super::config::{TELEGRAM_GROUP_ID, TELEGRAM_WEBHOOK_SECRET};
use super::errors::TelegramError;
use super::storage::LiveStatusStore;
use super::types::{LiveState, LiveStatus, Message, Update};

const LINKED_REPLY: &str = "Your Telegram account is now linked to Focus Squad. See you in the study room!";
const INVALID_CODE_REPLY: &str =
    "This link code is expired or invalid. Please generate a new one from the Focus Squad website.";
const ALREADY_LINKED_REPLY: &str = "This Telegram account is already linked to Focus Squad.";
const LINK_PROMPT_REPLY: &str =
    "Welcome to Focus Squad! Sign in on the website and tap the button below to link this Telegram account.";
const LINK_BUTTON_LABEL: &str = "Link my account";
const FAILURE_REPLY: &str = "Something went wrong while linking your account. Please try again later.";

/// What the webhook did with an update
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// Nothing the bot reacts to
    Ignored,
    Linked { user_id: String },
    /// The code was unknown, expired or already used
    LinkRejected,
    AlreadyLinked { user_id: String },
    /// A sign-in link was sent to an unlinked Telegram user
    LinkPrompted,
    LiveStatusUpdated(LiveState),
    /// Processing failed; the failure has been logged
    Failed,
}

/// Checks the `X-Telegram-Bot-Api-Secret-Token` header against `TELEGRAM_WEBHOOK_SECRET`.
pub fn verify_webhook_secret(provided: Option<&str>) -> Result<(), TelegramError> {
    check_webhook_secret(TELEGRAM_WEBHOOK_SECRET.as_deref(), provided)
}

fn check_webhook_secret(expected: Option<&str>, provided: Option<&str>) -> Result<(), TelegramError> {
    match expected {
        None => Ok(()),
        Some(expected) if provided.is_some_and(|p| safe_equal(expected, p)) => Ok(()),
        Some(_) => {
            tracing::warn!("Telegram webhook called with a wrong secret token");
            Err(TelegramError::Unauthorized)
        }
    }
}

/// Processes one webhook update. Failures are logged and answered with a
/// best-effort reply, never returned.
#[tracing::instrument(skip_all, fields(update_id = update.update_id))]
pub async fn handle_update(update: &Update, bot: &dyn BotApi) -> WebhookOutcome {
    let Some(message) = &update.message else {
        return WebhookOutcome::Ignored;
    };

    if message.video_chat_scheduled.is_some()
        || message.video_chat_started.is_some()
        || message.video_chat_ended.is_some()
    {
        return handle_video_chat(message).await;
    }

    let Some(command) = message
        .text
        .as_deref()
        .and_then(|text| parse_command(text, TELEGRAM_BOT_USERNAME.as_str()))
    else {
        return WebhookOutcome::Ignored;
    };

    let Some(from) = message.from.as_ref().filter(|from| !from.is_bot) else {
        return WebhookOutcome::Ignored;
    };

    let identity = TelegramIdentity {
        telegram_user_id: from.id,
        telegram_username: from.username.clone(),
    };
    let chat_id = message.chat.id;

    let (outcome, reply) = match command.code() {
        Some(code) => link_with_code(code, &identity, chat_id).await,
        None => prompt_for_link(&identity, chat_id).await,
    };

    if let Err(e) = bot.send_message(&reply).await {
        tracing::warn!(error = %e, chat_id, "Failed to send Telegram reply");
    }
    outcome
}

async fn link_with_code(
    code: &str,
    identity: &TelegramIdentity,
    chat_id: i64,
) -> (WebhookOutcome, OutgoingMessage) {
    match consume_link_code(code, identity).await {
        Ok(user) => (
            WebhookOutcome::Linked { user_id: user.id },
            OutgoingMessage::text(chat_id, LINKED_REPLY),
        ),
        Err(LinkError::InvalidOrExpired) => (
            WebhookOutcome::LinkRejected,
            OutgoingMessage::text(chat_id, INVALID_CODE_REPLY),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Linking with code failed");
            (
                WebhookOutcome::Failed,
                OutgoingMessage::text(chat_id, FAILURE_REPLY),
            )
        }
    }
}

async fn prompt_for_link(
    identity: &TelegramIdentity,
    chat_id: i64,
) -> (WebhookOutcome, OutgoingMessage) {
    match UserStore::get_user_by(UserSearchField::TelegramUserId(identity.telegram_user_id)).await
    {
        Ok(Some(user)) => {
            return (
                WebhookOutcome::AlreadyLinked { user_id: user.id },
                OutgoingMessage::text(chat_id, ALREADY_LINKED_REPLY),
            );
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Linked account lookup failed"),
    }

    match create_bot_link_url(identity) {
        Ok(url) => (
            WebhookOutcome::LinkPrompted,
            OutgoingMessage::text(chat_id, LINK_PROMPT_REPLY).with_button(LINK_BUTTON_LABEL, url),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build link URL");
            (
                WebhookOutcome::Failed,
                OutgoingMessage::text(chat_id, FAILURE_REPLY),
            )
        }
    }
}

async fn handle_video_chat(message: &Message) -> WebhookOutcome {
    let chat_id = message.chat.id;
    if TELEGRAM_GROUP_ID.is_some_and(|group| group != chat_id) {
        tracing::debug!(chat_id, "Ignoring video chat event from another chat");
        return WebhookOutcome::Ignored;
    }

    let previous = match LiveStatusStore::get(Some(chat_id)).await {
        Ok(previous) => previous,
        Err(e) => {
            tracing::error!(error = %e, chat_id, "Failed to read live status");
            return WebhookOutcome::Failed;
        }
    };

    let Some(status) = next_live_status(previous, message, Utc::now()) else {
        return WebhookOutcome::Ignored;
    };

    match LiveStatusStore::upsert(&status).await {
        Ok(()) => {
            tracing::info!(chat_id, status = %status.status, "Live status updated");
            WebhookOutcome::LiveStatusUpdated(status.status)
        }
        Err(e) => {
            tracing::error!(error = %e, chat_id, "Failed to store live status");
            WebhookOutcome::Failed
        }
    }
}

/// Applies a video-chat service message to the chat's previous status.
fn next_live_status(
    previous: Option<LiveStatus>,
    message: &Message,
    now: DateTime<Utc>,
) -> Option<LiveStatus> {
    let at = DateTime::from_timestamp(message.date, 0).unwrap_or(now);
    let base = previous.unwrap_or(LiveStatus {
        chat_id: message.chat.id,
        status: LiveState::Ended,
        scheduled_for: None,
        started_at: None,
        ended_at: None,
        updated_at: now,
    });

    let next = if let Some(scheduled) = &message.video_chat_scheduled {
        LiveStatus {
            status: LiveState::Scheduled,
            scheduled_for: DateTime::from_timestamp(scheduled.start_date, 0),
            ..base
        }
    } else if message.video_chat_started.is_some() {
        LiveStatus {
            status: LiveState::Live,
            started_at: Some(at),
            ended_at: None,
            ..base
        }
    } else if message.video_chat_ended.is_some() {
        LiveStatus {
            status: LiveState::Ended,
            scheduled_for: None,
            ended_at: Some(at),
            ..base
        }
    } else {
        return None;
    };

    Some(LiveStatus {
        updated_at: now,
        ..next
    })
}

/// Live status of the configured group, or of the most recently active chat.
pub async fn get_live_status() -> Result<Option<LiveStatus>, TelegramError> {
    LiveStatusStore::get(*TELEGRAM_GROUP_ID).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::create_session_for_account;
    use crate::link::create_link_for_user;
    use crate::telegram::bot::tests::RecordingBot;
    use crate::test_utils::{init_test_environment, unique_email};
    use serde_json::json;
    use serial_test::serial;

    fn command_update(telegram_user_id: i64, text: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "date": 1_700_000_000,
                "chat": {"id": telegram_user_id, "type": "private"},
                "from": {"id": telegram_user_id, "is_bot": false, "first_name": "Ada", "username": "ada_tg"},
                "text": text
            }
        }))
        .unwrap()
    }

    fn video_message(chat_id: i64, event: serde_json::Value) -> Message {
        let mut message = json!({
            "message_id": 9,
            "date": 1_700_000_000,
            "chat": {"id": chat_id, "type": "supergroup"}
        });
        if let (Some(obj), Some(event)) = (message.as_object_mut(), event.as_object()) {
            obj.extend(event.clone());
        }
        serde_json::from_value(message).unwrap()
    }

    #[test]
    fn test_check_webhook_secret() {
        assert!(check_webhook_secret(None, None).is_ok());
        assert!(check_webhook_secret(None, Some("anything")).is_ok());
        assert!(check_webhook_secret(Some("s3cret"), Some("s3cret")).is_ok());
        assert!(matches!(
            check_webhook_secret(Some("s3cret"), Some("wrong")),
            Err(TelegramError::Unauthorized)
        ));
        assert!(matches!(
            check_webhook_secret(Some("s3cret"), None),
            Err(TelegramError::Unauthorized)
        ));
    }

    #[test]
    fn test_next_live_status_transitions() {
        let now = Utc::now();
        let scheduled = next_live_status(
            None,
            &video_message(-5, json!({"video_chat_scheduled": {"start_date": 1_700_003_600}})),
            now,
        )
        .unwrap();
        assert_eq!(scheduled.status, LiveState::Scheduled);
        assert_eq!(scheduled.scheduled_for.unwrap().timestamp(), 1_700_003_600);

        let live = next_live_status(
            Some(scheduled),
            &video_message(-5, json!({"video_chat_started": {}})),
            now,
        )
        .unwrap();
        assert_eq!(live.status, LiveState::Live);
        assert_eq!(live.started_at.unwrap().timestamp(), 1_700_000_000);
        assert!(live.scheduled_for.is_some());

        let ended = next_live_status(
            Some(live),
            &video_message(-5, json!({"video_chat_ended": {"duration": 60}})),
            now,
        )
        .unwrap();
        assert_eq!(ended.status, LiveState::Ended);
        assert!(ended.started_at.is_some());
        assert!(ended.ended_at.is_some());
        assert!(ended.scheduled_for.is_none());
    }

    #[test]
    fn test_next_live_status_ignores_plain_messages() {
        let message = video_message(-5, json!({"text": "hello"}));
        assert!(next_live_status(None, &message, Utc::now()).is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_start_with_code_links_once() {
        init_test_environment().await;
        let (user, _) = create_session_for_account(&unique_email("webhook"), "Ada")
            .await
            .unwrap();
        let invite = create_link_for_user(&user).await.unwrap();
        let bot = RecordingBot::default();

        let first = handle_update(
            &command_update(90_001, &format!("/start {}", invite.code)),
            &bot,
        )
        .await;
        let second = handle_update(
            &command_update(90_001, &format!("/start {}", invite.code)),
            &bot,
        )
        .await;

        assert_eq!(first, WebhookOutcome::Linked { user_id: user.id.clone() });
        assert_eq!(second, WebhookOutcome::LinkRejected);

        let linked = UserStore::get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(linked.telegram_user_id, Some(90_001));
        assert_eq!(linked.telegram_username.as_deref(), Some("ada_tg"));

        let sent = bot.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, LINKED_REPLY);
        assert_eq!(sent[1].text, INVALID_CODE_REPLY);
        assert_eq!(sent[1].chat_id, 90_001);
    }

    #[tokio::test]
    #[serial]
    async fn test_start_without_code_prompts_with_button() {
        init_test_environment().await;
        let bot = RecordingBot::default();

        let outcome = handle_update(&command_update(90_002, "/start"), &bot).await;

        assert_eq!(outcome, WebhookOutcome::LinkPrompted);
        let sent = bot.sent.lock().await;
        let (label, url) = sent[0].button.clone().unwrap();
        assert_eq!(label, LINK_BUTTON_LABEL);
        assert!(url.contains("?t="));
    }

    #[tokio::test]
    #[serial]
    async fn test_start_without_code_when_already_linked() {
        init_test_environment().await;
        let (user, _) = create_session_for_account(&unique_email("relink"), "Ada")
            .await
            .unwrap();
        let invite = create_link_for_user(&user).await.unwrap();
        let bot = RecordingBot::default();
        handle_update(&command_update(90_003, &format!("/link {}", invite.code)), &bot).await;

        let outcome = handle_update(&command_update(90_003, "/link"), &bot).await;

        assert_eq!(outcome, WebhookOutcome::AlreadyLinked { user_id: user.id });
    }

    #[tokio::test]
    #[serial]
    async fn test_plain_text_is_ignored_without_reply() {
        init_test_environment().await;
        let bot = RecordingBot::default();

        let outcome = handle_update(&command_update(90_004, "good morning"), &bot).await;

        assert_eq!(outcome, WebhookOutcome::Ignored);
        assert!(bot.sent.lock().await.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_video_chat_started_updates_live_status() {
        init_test_environment().await;
        let update: Update = serde_json::from_value(json!({
            "update_id": 7,
            "message": {
                "message_id": 7,
                "date": 1_700_000_000,
                "chat": {"id": -100_222, "type": "supergroup"},
                "video_chat_started": {}
            }
        }))
        .unwrap();

        let outcome = handle_update(&update, &RecordingBot::default()).await;

        assert_eq!(outcome, WebhookOutcome::LiveStatusUpdated(LiveState::Live));
        let status = LiveStatusStore::get(Some(-100_222)).await.unwrap().unwrap();
        assert_eq!(status.status, LiveState::Live);
    }
}
