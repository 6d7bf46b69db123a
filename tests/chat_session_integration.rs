//! Chat sessions against a mock Q&A service

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aita::config::ApiConfig;
use aita::services::HttpQaService;
use aita::session::{
    ChatSession, CourseContext, ExchangeOutcome, MessageStatus, Sender, SessionOptions,
    SubmitError, FALLBACK_ANSWER,
};

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        chat_url: server.uri(),
        backend_url: server.uri(),
        request_timeout_seconds: 5,
    }
}

fn physics_session(server: &MockServer, options: SessionOptions) -> ChatSession {
    let service = Arc::new(HttpQaService::new(&api_config(server)).unwrap());
    ChatSession::new(service, CourseContext::for_course("c1", "physics"), options)
}

#[tokio::test]
async fn test_answered_exchange_records_question_answer_and_sources() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "question": "What is Newton's second law?",
            "subject": "physics",
            "course_id": "c1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "F = ma",
            "sources": [{"course": "Physics 101"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = physics_session(&server, SessionOptions::default());
    let outcome = session.submit("What is Newton's second law?").await.unwrap();

    let ExchangeOutcome::Answered { answer, .. } = outcome else {
        panic!("expected an answer, got {:?}", outcome);
    };
    assert_eq!(answer.text(), "F = ma");
    assert_eq!(answer.sources()[0].label, "Physics 101");

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0].sender(), Sender::User);
    assert_eq!(transcript.messages()[1].sender(), Sender::Assistant);
    assert!(!session.is_pending());
}

#[tokio::test]
async fn test_source_labels_fall_back_to_course_name_then_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "See the readings.",
            "sources": [
                {"course_name": "Mechanics"},
                {"page": 4},
                {"course": "Physics 101", "course_name": "ignored"}
            ]
        })))
        .mount(&server)
        .await;

    let session = physics_session(&server, SessionOptions::default());
    session.submit("Where do I read about torque?").await.unwrap();

    let labels: Vec<String> = session
        .transcript()
        .last()
        .unwrap()
        .sources()
        .iter()
        .map(|s| s.label.clone())
        .collect();
    assert_eq!(labels, vec!["Mechanics", "Unknown", "Physics 101"]);
}

#[tokio::test]
async fn test_server_error_yields_placeholder_and_advisory() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "index unavailable"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = physics_session(&server, SessionOptions::default());
    let outcome = session.submit("test").await.unwrap();
    assert!(matches!(outcome, ExchangeOutcome::Failed { .. }));

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    let placeholder = transcript.last().unwrap();
    assert_eq!(placeholder.status(), MessageStatus::Error);
    assert_eq!(placeholder.text(), FALLBACK_ANSWER);

    let advisory = session.advisory().unwrap();
    assert!(advisory.contains("500"));
    assert!(advisory.contains("index unavailable"));
    assert!(!session.is_pending());
}

#[tokio::test]
async fn test_malformed_answer_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "wrong shape"})))
        .mount(&server)
        .await;

    let session = physics_session(&server, SessionOptions::default());
    let outcome = session.submit("test").await.unwrap();
    assert!(matches!(outcome, ExchangeOutcome::Failed { .. }));
    assert!(session.advisory().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_slow_service_times_out_and_session_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let options = SessionOptions {
        exchange_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let session = physics_session(&server, options);

    let outcome = session.submit("slow").await.unwrap();
    assert!(matches!(outcome, ExchangeOutcome::Failed { .. }));
    assert!(session.advisory().unwrap().contains("timed out"));
    assert!(!session.is_pending());
    assert_eq!(*session.progress().borrow(), None);
}

#[tokio::test]
async fn test_overlapping_submit_sends_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "only once"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(physics_session(&server, SessionOptions::default()));
    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("first").await })
    };
    while !session.is_pending() {
        tokio::task::yield_now().await;
    }

    assert_eq!(
        session.submit("second").await,
        Err(SubmitError::ExchangePending)
    );

    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, ExchangeOutcome::Answered { .. }));
    let texts: Vec<String> = session
        .transcript()
        .iter()
        .map(|m| m.text().to_string())
        .collect();
    assert_eq!(texts, vec!["first", "only once"]);
}
