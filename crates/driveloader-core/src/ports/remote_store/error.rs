//! Error types for remote store port operations.

use thiserror::Error;

/// Errors from remote store port operations.
///
/// These are domain-level errors that consumers can handle.
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemotePortError {
    /// The requested object does not exist (or is not visible).
    #[error("Object not found: {id}")]
    NotFound {
        /// The id that was requested
        id: String,
    },

    /// The object cannot be downloaded as raw bytes and must be exported.
    #[error("Object {id} is not binary-downloadable")]
    NotDownloadable {
        /// The id of the document-kind object
        id: String,
    },

    /// Authentication required or failed.
    #[error("Authentication failed: {message}")]
    AuthRequired {
        /// What the store said
        message: String,
    },

    /// API rate limit exceeded.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

impl RemotePortError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Network { .. })
    }
}

/// Result type alias for remote store port operations.
pub type RemotePortResult<T> = Result<T, RemotePortError>;
