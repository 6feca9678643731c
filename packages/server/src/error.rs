//! API error type and its mapping to HTTP responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Errors returned by request handlers.
///
/// Bodies are always `{"error": "<message>"}`; for [`ApiError::Unexpected`]
/// the message is generic and the underlying cause is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// Logs `cause` and returns a 500 carrying only `message`.
    pub fn unexpected(message: &str, cause: impl std::fmt::Display) -> Self {
        log::error!("{message}: {cause}");
        Self::Unexpected(message.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
