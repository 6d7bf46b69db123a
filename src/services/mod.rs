//! Clients for the collaborator services
//!
//! - `qa`: the Q&A service the chat session talks to
//! - `auth`: login and signup against the backend
//! - `courses`: course directory lookups

pub mod auth;
pub mod courses;
pub mod qa;

pub use auth::{AuthClient, SignupRequest};
pub use courses::{Course, CourseDirectory, HttpCourseDirectory};
pub use qa::{HttpQaService, QaAnswer, QaRequest, QaService};

use crate::error::{AitaError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Build the shared HTTP client configuration
pub(crate) fn build_client(timeout_seconds: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("aita/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AitaError::Config(format!("Failed to create HTTP client: {}", e)).into())
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the `detail` message of a FastAPI-style error body
///
/// Validation errors carry a list instead of a string; those are rendered
/// as compact JSON.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
