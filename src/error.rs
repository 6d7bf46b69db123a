//! Error types for AITA
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for AITA operations
///
/// Covers configuration loading, collaborator services (authentication,
/// course directory, Q&A service), credential storage and the underlying
/// transport and serialization layers.
#[derive(Error, Debug)]
pub enum AitaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors (bad credentials, expired token, 401 responses)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Course directory lookups (not enrolled, unknown course)
    #[error("Course error: {0}")]
    CourseDirectory(String),

    /// Q&A service failures (non-success status, malformed answer body)
    #[error("Chat service error: {0}")]
    QaService(String),

    /// An exchange or request exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// No stored credential or an unusable one
    #[error("Credential error: {0}")]
    Credentials(String),

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

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for AITA operations
///
/// Uses `anyhow::Error` as the error type, allowing rich error context
/// and easy propagation across command handlers.
pub type Result<T> = anyhow::Result<T>;
