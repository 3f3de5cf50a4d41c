use crate::link::LinkTokenStore;
use crate::session::bump_session_version;
use crate::userdb::{User, UserStore};

use super::errors::AdminError;
use super::guard::AdminPrincipal;

pub async fn list_users() -> Result<Vec<User>, AdminError> {
    Ok(UserStore::get_all_users().await?)
}

async fn get_existing_user(user_id: &str) -> Result<User, AdminError> {
    UserStore::get_user(user_id).await?.ok_or_else(|| {
        AdminError::ResourceNotFound {
            resource_type: "User".to_string(),
            resource_id: user_id.to_string(),
        }
        .log()
    })
}

fn refuse_self(actor: &AdminPrincipal, user_id: &str, action: &str) -> Result<(), AdminError> {
    if actor.user_id() == Some(user_id) {
        return Err(AdminError::Conflict(format!("Admins cannot {action} themselves")).log());
    }
    Ok(())
}

/// Grants or revokes admin rights.
///
/// Emails on the `ADMIN_EMAILS` allowlist stay admins regardless.
#[tracing::instrument(skip(actor))]
pub async fn set_user_admin(
    actor: &AdminPrincipal,
    user_id: &str,
    is_admin: bool,
) -> Result<User, AdminError> {
    if !is_admin {
        refuse_self(actor, user_id, "demote")?;
    }
    let user = get_existing_user(user_id).await?;

    let user = UserStore::upsert_user(User { is_admin, ..user }).await?;
    tracing::info!(user_id, is_admin = user.is_admin, "Admin flag updated");
    Ok(user)
}

/// Blocks or unblocks a user. A blocked user's sessions stop working on their next request.
#[tracing::instrument(skip(actor))]
pub async fn set_user_blocked(
    actor: &AdminPrincipal,
    user_id: &str,
    is_blocked: bool,
) -> Result<User, AdminError> {
    if is_blocked {
        refuse_self(actor, user_id, "block")?;
    }
    let user = get_existing_user(user_id).await?;

    let user = UserStore::upsert_user(User { is_blocked, ..user }).await?;
    tracing::info!(user_id, is_blocked, "Blocked flag updated");
    Ok(user)
}

/// Deletes a user together with their pending link codes.
#[tracing::instrument(skip(actor))]
pub async fn delete_user_account(actor: &AdminPrincipal, user_id: &str) -> Result<(), AdminError> {
    refuse_self(actor, user_id, "delete")?;
    let user = get_existing_user(user_id).await?;

    let removed_tokens = LinkTokenStore::delete_tokens_for_email(&user.email).await?;
    UserStore::delete_user(&user.id).await?;

    tracing::info!(user_id, removed_tokens, "User account deleted");
    Ok(())
}

/// Signs everybody out by bumping the global session version.
pub async fn reset_session_version() -> Result<i64, AdminError> {
    Ok(bump_session_version().await?)
}
