//! Error types for ratefetch
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Transport failures and timeouts are retryable; handler rejections and
//! exhausted retry budgets are final.

use thiserror::Error;

/// The main error type for ratefetch
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connection, TLS, protocol)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The timeout guard cancelled an in-flight request
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout that expired
        timeout_ms: u64,
    },

    /// The retry budget for a request was exhausted
    #[error("Max attempts ({attempts}) exceeded")]
    MaxAttemptsExceeded {
        /// Configured attempt limit
        attempts: u32,
    },

    /// A status handler explicitly rejected the response
    #[error("Rejected by status handler (HTTP {status}): {message}")]
    HandlerRejected {
        /// Status code of the intercepted response
        status: u16,
        /// Reason supplied by the handler
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// The request was dropped before it settled (e.g. runtime shutdown)
    #[error("Request was dropped before completion")]
    ChannelClosed,
}

impl Error {
    /// Create a handler rejection error
    pub fn handler_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::HandlerRejected {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable by the scheduler
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Timeout { .. })
    }
}

/// Result type alias for ratefetch
pub type Result<T> = std::result::Result<T, Error>;
