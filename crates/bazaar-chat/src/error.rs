//! Error types for chat engine operations.

use thiserror::Error;

/// Result type for chat engine operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors that can occur while driving a chat session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChatError {
    #[error("authorization rejected: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("channel subscription error: {0}")]
    Subscription(String),

    #[error("subscription closed")]
    SubscriptionClosed,

    #[error("no active chat session")]
    NoSession,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else if err.is_decode() {
            ChatError::Network(format!("response body: {err}"))
        } else {
            ChatError::Network(err.to_string())
        }
    }
}

impl ChatError {
    /// Check if this error is worth retrying at a higher layer.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Timeout | ChatError::Network(_) | ChatError::Subscription(_) => true,
            ChatError::Status { status, .. } => matches!(status, 408 | 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Check if this error means the session credential was rejected.
    #[inline]
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, ChatError::Auth(_))
    }
}
