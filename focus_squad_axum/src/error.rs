use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{Result as HttpResponse, StatusCode};

use focus_squad::{
    AdminError, AdminGuardError, CsrfError, LinkError, RateLimitError, SessionError,
    TelegramError,
};

const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// An error answered as `{"error": "<message>"}` with the given status
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A 500 whose details stay in the log
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

impl<T> IntoResponseError<T> for Result<T, LinkError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            LinkError::InvalidOrExpired | LinkError::Token(_) => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            LinkError::UserNotFound => ErrorResponse::new(StatusCode::NOT_FOUND, e.to_string()),
            _ => ErrorResponse::internal(e),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, AdminError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            AdminError::ResourceNotFound { .. } => {
                ErrorResponse::new(StatusCode::NOT_FOUND, e.to_string())
            }
            AdminError::Conflict(_) => ErrorResponse::new(StatusCode::CONFLICT, e.to_string()),
            _ => ErrorResponse::internal(e),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, AdminGuardError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            if let AdminGuardError::Storage(detail) = &e {
                tracing::error!("Admin guard storage error: {}", detail);
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            ErrorResponse::new(status, e.message())
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            SessionError::SessionError => ErrorResponse::new(StatusCode::UNAUTHORIZED, "unauthorized"),
            SessionError::Blocked => ErrorResponse::new(StatusCode::FORBIDDEN, "forbidden"),
            _ => ErrorResponse::internal(e),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, TelegramError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            TelegramError::Unauthorized => ErrorResponse::new(StatusCode::UNAUTHORIZED, "unauthorized"),
            _ => ErrorResponse::internal(e),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, CsrfError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| match e {
            CsrfError::Utils(_) => ErrorResponse::internal(e),
            _ => ErrorResponse::new(StatusCode::FORBIDDEN, e.to_string()),
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, RateLimitError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(ErrorResponse::internal)
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(ErrorResponse::internal)
    }
}
