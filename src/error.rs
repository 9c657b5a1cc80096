//! Custom error types for promptrelay.
//!
//! `RelayError` is what the HTTP layer sees; every variant knows its status
//! code and renders as a flat `{ "error": "..." }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::chat::ChatError;

/// Shown when the upstream rejects our credential.
pub const INVALID_KEY_MESSAGE: &str = "Invalid API key. Please check your credentials.";

/// Shown when the upstream call times out.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Shown when the upstream answered but produced no text.
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "AI could not generate a meaningful response. Please try again.";

/// Fallback for errors that carry no usable message.
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Main error type for promptrelay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Client input error (missing fields, malformed body)
    #[error("{0}")]
    Validation(String),

    /// Chat-completion call failed; message already normalized for the caller
    #[error("{0}")]
    Upstream(String),

    /// Chat-completion call succeeded but returned no content
    #[error("{}", EMPTY_RESPONSE_MESSAGE)]
    EmptyResponse,

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File / socket I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatError> for RelayError {
    fn from(e: ChatError) -> Self {
        RelayError::Upstream(normalize_upstream_error(&e))
    }
}

/// JSON body for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

/// Map a chat-client failure to the message returned to the caller.
///
/// Classified variants win; anything else is matched on its text the same
/// way, and falls back to the error's own message.
pub fn normalize_upstream_error(err: &ChatError) -> String {
    match err {
        ChatError::Unauthorized(_) => return INVALID_KEY_MESSAGE.to_string(),
        ChatError::Timeout => return TIMEOUT_MESSAGE.to_string(),
        _ => {}
    }

    let message = err.to_string();
    if message.contains("invalid API key") {
        INVALID_KEY_MESSAGE.to_string()
    } else if message.contains("timeout") {
        TIMEOUT_MESSAGE.to_string()
    } else if message.trim().is_empty() {
        UNEXPECTED_MESSAGE.to_string()
    } else {
        message
    }
}

/// Result type alias using `RelayError`
pub type Result<T> = std::result::Result<T, RelayError>;
