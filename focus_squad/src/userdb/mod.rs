mod config;
mod errors;
mod storage;
mod types;

pub use errors::UserError;
pub use types::{User, UserSearchField, normalize_email};

pub(crate) use config::is_allowlisted_admin;
pub(crate) use storage::UserStore;

pub(crate) async fn init() -> Result<(), UserError> {
    UserStore::init().await
}
