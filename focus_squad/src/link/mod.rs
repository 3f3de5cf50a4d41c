mod config;
mod errors;
mod main;
mod storage;
mod types;

pub use config::TELEGRAM_BOT_USERNAME;
pub use errors::LinkError;
pub use main::{
    confirm_bot_link, consume_link_code, create_bot_link_url, create_link_for_user,
    unlink_telegram,
};
pub use types::{LinkInvite, LinkToken, TelegramIdentity};

pub(crate) use storage::LinkTokenStore;

pub(crate) async fn init() -> Result<(), LinkError> {
    LinkTokenStore::init().await
}
