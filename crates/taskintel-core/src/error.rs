//! Error types for the task intelligence system.

/// Result type alias for task intelligence operations.
pub type Result<T> = std::result::Result<T, IntelError>;

/// Main error type for the task intelligence system.
#[derive(Debug, thiserror::Error)]
pub enum IntelError {
    /// One task-source collection was unreachable or returned garbage.
    /// Always isolated at the aggregation boundary, never user-visible.
    #[error("Source error: {0}")]
    Source(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signature or timestamp rejection on an inbound command
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Callback delivery failed after bounded retries
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Operation exceeded its time budget
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// A remote response that could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntelError {
    /// Create a new source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new auth error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Check if this error is worth retrying (transient network conditions)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Timeout(_) | Self::Delivery(_))
    }
}
