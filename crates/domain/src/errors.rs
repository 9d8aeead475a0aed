//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for LifeBridge
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LifeBridgeError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LifeBridgeError {
    /// True when the failed operation may succeed on a later trigger.
    ///
    /// Storage and network failures are recovered locally (empty reads,
    /// dropped writes, deferred flushes) and are therefore retryable.
    /// Configuration and input errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Network(_) | Self::Internal(_))
    }
}

/// Result type alias for LifeBridge operations
pub type Result<T> = std::result::Result<T, LifeBridgeError>;
