mod config;
mod errors;
mod main;
mod storage;
mod types;

pub use config::{SESSION_COOKIE_NAME, SESSION_VERSION_COOKIE_NAME};
pub use errors::SessionError;
pub use main::{
    SessionState, bump_session_version, create_session_for_account, create_session_with_uid,
    current_session_version, generate_session_id, get_session_id_from_headers,
    get_user_from_session, needs_rolling_rotation, prepare_logout_response, resolve_session,
    resolve_session_rolling_interval, session_version_cookie_header,
};
pub use types::User;

pub(crate) use storage::AppStateStore;
