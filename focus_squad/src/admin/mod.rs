//! Admin authorization and the actions admins can take.

mod actions;
mod config;
mod errors;
mod guard;
mod internal;

pub use actions::{
    delete_user_account, list_users, reset_session_version, set_user_admin, set_user_blocked,
};
pub use config::INTERNAL_ADMIN_SIGNATURE_HEADER;
pub use errors::{AdminError, AdminGuardError};
pub use guard::{
    AdminPrincipal, has_valid_internal_signature, require_admin_or_internal, require_admin_session,
};
pub use internal::{sign_internal_request, verify_internal_signature};
