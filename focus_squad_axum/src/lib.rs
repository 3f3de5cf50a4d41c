//! focus-squad-axum - axum integration for the focus-squad authorization core
//!
//! Provides the [`AuthUser`] extractor, the page [`session_gate`], CSRF and
//! rate-limit middleware, the `/api` router and the forced sign-out route.

mod admin;
mod csrf;
mod error;
mod link;
mod middleware;
mod router;
mod session;
mod signout;
mod telegram;

#[cfg(test)]
mod test_utils;

pub use admin::AdminCaller;
pub use error::{ErrorResponse, IntoResponseError};
pub use middleware::{csrf_protect, rate_limit, session_gate};
pub use router::{focus_squad_router, focus_squad_router_with_bot};
pub use session::AuthUser;
pub use signout::signout_router;

// Re-export the paths and initialization function from the core crate
pub use focus_squad::{FS_LINK_PAGE_PATH, FS_SIGNIN_PATH, FS_SIGNOUT_PATH, init};
