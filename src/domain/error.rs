//! Error types shared by the ports

use thiserror::Error;

/// Errors raised by a form store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Stored value exists but is not a readable form configuration
    #[error("Malformed form configuration '{id}': {reason}")]
    Malformed { id: String, reason: String },

    /// Identifier cannot be used as a storage key
    #[error("Invalid form identifier: '{0}'")]
    InvalidId(String),

    /// Backing storage failed
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Malformed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised while delivering a submission to a webhook
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Webhook request timed out")]
    Timeout,

    /// Client could not be built or the URL was rejected
    #[error("Invalid webhook request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebhookError::Timeout
        } else if err.is_connect() {
            WebhookError::Network(format!("Connection error: {}", err))
        } else if err.is_builder() {
            WebhookError::InvalidRequest(err.to_string())
        } else {
            WebhookError::Network(err.to_string())
        }
    }
}
