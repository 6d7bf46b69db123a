//! Course directory lookups
//!
//! A chat session needs the course's id and subject before it starts. The
//! directory resolves them from a course id using the signed-in account's
//! bearer credential.

use crate::account::AuthSession;
use crate::config::ApiConfig;
use crate::error::{AitaError, Result};
use crate::services::{build_client, detail_from_body};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Course details as the backend returns them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub course_code: Option<String>,
}

/// The backend uses integer ids; accept either representation
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(i64),
        Text(String),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Num(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

/// Source of course details
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// Looks up one course the account has access to
    ///
    /// # Errors
    ///
    /// Returns a course error when the account is not enrolled or the course
    /// cannot be fetched, an authentication error when the token is rejected
    async fn course(&self, auth: &AuthSession, course_id: &str) -> Result<Course>;
}

/// `CourseDirectory` over HTTP
pub struct HttpCourseDirectory {
    client: Client,
    base_url: String,
}

impl HttpCourseDirectory {
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_seconds)?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CourseDirectory for HttpCourseDirectory {
    async fn course(&self, auth: &AuthSession, course_id: &str) -> Result<Course> {
        let url = format!("{}/api/courses/{}", self.base_url, course_id);
        tracing::debug!(course_id = %course_id, "Fetching course details");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, auth.bearer())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Course request failed: {}", e);
                AitaError::CourseDirectory(format!("Failed to fetch course details: {}", e))
            })?;

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN => {
                return Err(AitaError::CourseDirectory(
                    "You are not enrolled in this course".to_string(),
                )
                .into())
            }
            StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_default();
                let reason = detail_from_body(&body)
                    .unwrap_or_else(|| "Session expired, please log in again".to_string());
                return Err(AitaError::Authentication(reason).into());
            }
            s if !s.is_success() => {
                tracing::warn!("Course lookup for {} returned {}", course_id, s);
                return Err(AitaError::CourseDirectory(
                    "Failed to fetch course details".to_string(),
                )
                .into());
            }
            _ => {}
        }

        let course: Course = response.json().await.map_err(|e| {
            AitaError::CourseDirectory(format!("Malformed course details: {}", e))
        })?;
        tracing::info!(course_id = %course.id, subject = %course.subject, "Resolved course");
        Ok(course)
    }
}
