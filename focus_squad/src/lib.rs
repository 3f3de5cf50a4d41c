//! focus-squad - authorization core of the Focus Squad study platform
//!
//! Framework-independent building blocks: sessions with rolling rotation and a
//! global session version, double-submit CSRF, the admin guard, page gate
//! decisions, the Telegram link flow and webhook, and a shared rate limiter.

mod admin;
mod config;
mod csrf;
mod gate;
mod link;
mod rate_limit;
mod session;
mod storage;
mod telegram;
mod token;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{APP_BASE_URL, FS_LINK_PAGE_PATH, FS_SIGNIN_PATH, FS_SIGNOUT_PATH};

pub use admin::{
    AdminError, AdminGuardError, AdminPrincipal, INTERNAL_ADMIN_SIGNATURE_HEADER,
    delete_user_account, has_valid_internal_signature, list_users, require_admin_or_internal, require_admin_session,
    reset_session_version, set_user_admin, set_user_blocked, sign_internal_request,
    verify_internal_signature,
};

pub use csrf::{
    CSRF_COOKIE_NAME, CSRF_HEADER_NAME, CsrfError, csrf_cookie_header, generate_csrf_token,
    is_state_changing, safe_equal, verify_double_submit, verify_request as verify_csrf_request,
};

pub use gate::{
    GateDecision, GateRequest, GateSession, SignInErrorInfo, evaluate_gate, is_public_path,
    resolve_sign_in_error, sanitize_callback_path,
};

pub use link::{
    LinkError, LinkInvite, LinkToken, TELEGRAM_BOT_USERNAME, TelegramIdentity, confirm_bot_link,
    consume_link_code, create_bot_link_url, create_link_for_user, unlink_telegram,
};

pub use rate_limit::{RateLimitDecision, RateLimitError, RateLimiter, client_key};

pub use session::{
    SESSION_COOKIE_NAME, SESSION_VERSION_COOKIE_NAME, SessionError, SessionState,
    User as SessionUser, bump_session_version, create_session_for_account,
    create_session_with_uid, current_session_version, generate_session_id,
    get_session_id_from_headers, get_user_from_session, needs_rolling_rotation,
    prepare_logout_response, resolve_session, resolve_session_rolling_interval,
    session_version_cookie_header,
};

pub use telegram::{
    BotApi, BotCommand, Chat, LiveState, LiveStatus, LogOnlyBot, Message, OutgoingMessage,
    TelegramBotClient, TelegramError, TelegramUser, Update, VideoChatEnded, VideoChatScheduled,
    VideoChatStarted, WebhookOutcome, default_bot, get_live_status, handle_update, parse_command,
    verify_webhook_secret,
};

pub use token::{
    SignedClaims, TokenError, hmac_sha256, sign_claims, sign_payload, verify_claims,
    verify_payload,
};

pub use userdb::{User, UserError};

pub use utils::UtilError;

/// Initialize the stores. Call once at startup, before serving requests.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    userdb::init().await?;
    session::AppStateStore::init().await?;
    link::init().await?;
    telegram::init().await?;
    Ok(())
}
