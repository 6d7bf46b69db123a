//! Q&A service client
//!
//! The Q&A service answers one question at a time, scoped to a course's
//! retrieval domain. [`QaService`] is the seam the session controller calls;
//! [`HttpQaService`] implements it against the `POST /api/chat` endpoint.

use crate::config::ApiConfig;
use crate::error::{AitaError, Result};
use crate::services::{build_client, detail_from_body};
use crate::session::Source;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Label used when a citation carries neither `course` nor `course_name`
pub const UNKNOWN_SOURCE_LABEL: &str = "Unknown";

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaRequest {
    pub question: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

/// A parsed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaAnswer {
    pub text: String,
    pub sources: Vec<Source>,
}

/// The external service that turns a question into an answer
#[async_trait]
pub trait QaService: Send + Sync {
    /// Sends one question and waits for its answer
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status or a body that
    /// does not parse as an answer
    async fn ask(&self, request: &QaRequest) -> Result<QaAnswer>;
}

/// Success body of `POST /api/chat`
#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    answer: String,
    #[serde(default)]
    sources: Option<Vec<RawSource>>,
}

/// Citation as the service sends it
///
/// Different service versions name the label `course` or `course_name`;
/// both are accepted and normalized into [`Source::label`].
#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    course: Option<String>,
    #[serde(default)]
    course_name: Option<String>,
}

impl From<RawSource> for Source {
    fn from(raw: RawSource) -> Self {
        let label = raw
            .course
            .filter(|s| !s.is_empty())
            .or(raw.course_name.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| UNKNOWN_SOURCE_LABEL.to_string());
        Source::new(label)
    }
}

/// Parses a success body into an answer
fn parse_answer(body: &str) -> Result<QaAnswer> {
    let parsed: ChatResponseBody = serde_json::from_str(body)
        .map_err(|e| AitaError::QaService(format!("Malformed answer from chat service: {}", e)))?;
    Ok(QaAnswer {
        text: parsed.answer,
        sources: parsed
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(Source::from)
            .collect(),
    })
}

/// `QaService` over HTTP
pub struct HttpQaService {
    client: Client,
    base_url: String,
}

impl HttpQaService {
    /// Create a client for the configured chat service
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use aita::config::ApiConfig;
    /// use aita::services::HttpQaService;
    ///
    /// let service = HttpQaService::new(&ApiConfig::default()).unwrap();
    /// assert_eq!(service.endpoint(), "http://localhost:8001/api/chat");
    /// ```
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = build_client(config.request_timeout_seconds)?;
        tracing::info!("Initialized chat service client: url={}", config.chat_url);
        Ok(Self {
            client,
            base_url: config.chat_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl QaService for HttpQaService {
    async fn ask(&self, request: &QaRequest) -> Result<QaAnswer> {
        let url = self.endpoint();
        tracing::debug!(
            subject = %request.subject,
            course_id = ?request.course_id,
            question_len = request.question.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                AitaError::QaService(format!("Could not reach the chat service: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AitaError::QaService(format!("Failed to read chat service response: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("Chat service returned error {}: {}", status, body);
            let reason = detail_from_body(&body).unwrap_or_else(|| status.to_string());
            return Err(AitaError::QaService(format!(
                "Chat service returned {}: {}",
                status.as_u16(),
                reason
            ))
            .into());
        }

        let answer = parse_answer(&body)?;
        tracing::debug!(sources = answer.sources.len(), "Chat response received");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_course_id() {
        let request = QaRequest {
            question: "hi".to_string(),
            subject: "generic".to_string(),
            course_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("course_id").is_none());
        assert_eq!(json["subject"], "generic");
    }

    #[test]
    fn test_request_includes_course_id() {
        let request = QaRequest {
            question: "What is Newton's second law?".to_string(),
            subject: "physics".to_string(),
            course_id: Some("c1".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["course_id"], "c1");
        assert_eq!(json["question"], "What is Newton's second law?");
    }

    #[test]
    fn test_parse_answer_with_course_field() {
        let answer =
            parse_answer(r#"{"answer":"F = ma","sources":[{"course":"Physics 101","rank":1}]}"#)
                .unwrap();
        assert_eq!(answer.text, "F = ma");
        assert_eq!(answer.sources, vec![Source::new("Physics 101")]);
    }

    #[test]
    fn test_parse_answer_with_course_name_field() {
        let answer =
            parse_answer(r#"{"answer":"x","sources":[{"course_name":"Calculus I","chunk_id":"7"}]}"#)
                .unwrap();
        assert_eq!(answer.sources[0].label, "Calculus I");
    }

    #[test]
    fn test_course_preferred_over_course_name() {
        let answer = parse_answer(
            r#"{"answer":"x","sources":[{"course":"A","course_name":"B"},{"file_id":"f"}]}"#,
        )
        .unwrap();
        assert_eq!(answer.sources[0].label, "A");
        assert_eq!(answer.sources[1].label, UNKNOWN_SOURCE_LABEL);
    }

    #[test]
    fn test_parse_answer_without_sources() {
        let answer = parse_answer(r#"{"answer":"No materials found."}"#).unwrap();
        assert!(answer.sources.is_empty());
        let answer = parse_answer(r#"{"answer":"x","sources":null}"#).unwrap();
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn test_parse_answer_rejects_missing_answer() {
        let err = parse_answer(r#"{"sources":[]}"#).unwrap_err();
        assert!(err.to_string().contains("Malformed answer"));
        assert!(parse_answer("<html>oops</html>").is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ApiConfig {
            chat_url: "http://chat.test/".to_string(),
            ..Default::default()
        };
        let service = HttpQaService::new(&config).unwrap();
        assert_eq!(service.endpoint(), "http://chat.test/api/chat");
    }
}
