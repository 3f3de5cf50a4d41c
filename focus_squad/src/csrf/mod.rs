//! Double-submit CSRF protection.
//!
//! A random token lives in a cookie readable by page scripts; state-changing
//! requests must echo it in a header. Nothing is stored server side.

mod config;
mod errors;
mod main;

pub use config::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
pub use errors::CsrfError;
pub use main::{
    csrf_cookie_header, generate_csrf_token, is_state_changing, safe_equal, verify_double_submit,
    verify_request,
};
