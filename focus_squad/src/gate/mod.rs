//! Per-request routing decisions for page requests.
//!
//! Everything here is pure: callers resolve the session and version first and
//! apply the returned [`GateDecision`].

mod callback;
mod config;
mod decision;
mod signin_error;

pub use callback::sanitize_callback_path;
pub use config::is_public_path;
pub use decision::{GateDecision, GateRequest, GateSession, evaluate_gate};
pub use signin_error::{SignInErrorInfo, resolve_sign_in_error};
