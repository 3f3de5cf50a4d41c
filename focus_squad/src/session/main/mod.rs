mod rotation;
mod session;
mod version;

pub use rotation::{generate_session_id, needs_rolling_rotation, resolve_session_rolling_interval};
pub use session::{
    SessionState, create_session_for_account, create_session_with_uid,
    get_session_id_from_headers, get_user_from_session, prepare_logout_response,
    resolve_session,
};
pub use version::{bump_session_version, current_session_version, session_version_cookie_header};
