//! Error types for ragchat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for ragchat operations
///
/// Covers configuration loading, remote API failures, local precondition
/// violations (no session, missing file) and the IO/serialization errors
/// that bubble up from the crates underneath.
#[derive(Error, Debug)]
pub enum RagChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote API rejected a request (quota, validation, server error)
    #[error("Remote error ({status}): {message}")]
    Remote {
        /// HTTP status code returned by the API
        status: u16,
        /// Message extracted from the API error body
        message: String,
    },

    /// The remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A chat operation was attempted without an active session
    #[error("Chat session not started. Use '/start' first")]
    NoActiveSession,

    /// A local file or directory does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// An upload operation finished with an error status
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Waiting for an upload operation exceeded the configured timeout
    #[error("Upload operation {operation} did not complete within {seconds}s")]
    UploadTimeout {
        /// Remote operation name
        operation: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// Deleting a store did not succeed
    #[error("Failed to delete store {0}")]
    DeleteFailed(String),

    /// Capability the remote API offers but this client does not implement
    #[error("Not supported yet: {0}")]
    Unsupported(String),

    /// Writing a chat export failed
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors
    #[error("Input error: {0}")]
    Input(String),
}

impl RagChatError {
    /// Returns true when the error means the remote resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Remote { status: 404, .. })
    }
}

/// Result type alias for ragchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
