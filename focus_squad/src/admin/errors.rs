use thiserror::Error;

use crate::link::LinkError;
use crate::session::SessionError;
use crate::userdb::UserError;

/// Why an admin-only request was refused
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdminGuardError {
    /// No session and no valid internal signature
    #[error("unauthorized")]
    Unauthorized,

    /// Signed in, but not an admin
    #[error("forbidden")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AdminGuardError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Storage(_) => 500,
        }
    }

    /// Message safe to show to the caller
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Storage(_) => "internal error",
        }
    }
}

impl From<UserError> for AdminGuardError {
    fn from(err: UserError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Errors from admin actions
#[derive(Debug, Error, Clone)]
pub enum AdminError {
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// The action would leave the acting admin without access
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("User error: {0}")]
    User(UserError),

    #[error("Session error: {0}")]
    Session(SessionError),

    #[error("Link error: {0}")]
    Link(LinkError),
}

impl AdminError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::warn!("Resource not found: {} {}", resource_type, resource_id),
            Self::Conflict(msg) => tracing::warn!("Conflict: {}", msg),
            Self::User(err) => tracing::error!("User error: {}", err),
            Self::Session(err) => tracing::error!("Session error: {}", err),
            Self::Link(err) => tracing::error!("Link error: {}", err),
        }
        self
    }
}

impl From<UserError> for AdminError {
    fn from(err: UserError) -> Self {
        Self::User(err).log()
    }
}

impl From<SessionError> for AdminError {
    fn from(err: SessionError) -> Self {
        Self::Session(err).log()
    }
}

impl From<LinkError> for AdminError {
    fn from(err: LinkError) -> Self {
        Self::Link(err).log()
    }
}
