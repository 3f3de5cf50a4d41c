use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CsrfError {
    #[error("CSRF cookie missing")]
    MissingCookie,

    #[error("CSRF header missing")]
    MissingHeader,

    #[error("CSRF token mismatch")]
    Mismatch,

    #[error("Utils error: {0}")]
    Utils(String),
}

impl From<UtilError> for CsrfError {
    fn from(err: UtilError) -> Self {
        Self::Utils(err.to_string())
    }
}
