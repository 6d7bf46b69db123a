//! Session controller: one question/answer exchange at a time
//!
//! [`ChatSession`] owns a transcript, the pending flag and the typing
//! indicator for one course chat. [`ChatSession::submit`] appends the
//! question, calls the Q&A service, and appends exactly one assistant
//! message (the answer or an error placeholder) before clearing the pending
//! flag. A second submit while an exchange is pending is rejected, never
//! queued.

use crate::config::ChatConfig;
use crate::error::AitaError;
use crate::services::{Course, QaRequest, QaService};
use crate::session::progress::{ProgressIndicator, DEFAULT_PERIOD};
use crate::session::transcript::{Message, MessageId, NewMessage, Transcript};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

/// Text shown in the transcript in place of a failed answer
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error. Please try again.";

/// Advisory recorded when a submit is dropped before its answer arrives
pub const ABANDONED_REASON: &str = "Failed to get response: request was abandoned";

/// Default deadline of one exchange
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(60);

/// The course a session is grounded in, fixed for the session's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseContext {
    course_id: Option<String>,
    subject: String,
}

impl CourseContext {
    pub fn for_course(course_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id.into()),
            subject: subject.into(),
        }
    }

    /// A session not tied to any course
    pub fn ungrounded(subject: impl Into<String>) -> Self {
        Self {
            course_id: None,
            subject: subject.into(),
        }
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    fn request(&self, question: &str) -> QaRequest {
        QaRequest {
            question: question.to_string(),
            subject: self.subject.clone(),
            course_id: self.course_id.clone(),
        }
    }
}

impl From<&Course> for CourseContext {
    fn from(course: &Course) -> Self {
        Self::for_course(course.id.clone(), course.subject.clone())
    }
}

/// Why a submit was refused
///
/// A refused submit leaves the transcript untouched and makes no request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Still waiting for the previous answer")]
    ExchangePending,

    #[error("Chat session has been closed")]
    SessionClosed,
}

/// How an accepted exchange ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// The service answered; `answer` is the appended assistant message
    Answered { question: MessageId, answer: Message },
    /// The exchange failed; `placeholder` is the appended error message and
    /// `reason` the advisory text
    Failed {
        question: MessageId,
        placeholder: Message,
        reason: String,
    },
    /// The session was closed while the request was in flight; nothing was
    /// applied
    Discarded { question: MessageId },
}

/// Timing knobs of a session
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub exchange_timeout: Duration,
    pub typing_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            typing_interval: DEFAULT_PERIOD,
        }
    }
}

impl From<&ChatConfig> for SessionOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            exchange_timeout: config.exchange_timeout(),
            typing_interval: config.typing_interval(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Transcript,
    /// Ticket of the in-flight exchange
    pending: Option<u64>,
    last_ticket: u64,
    advisory: Option<String>,
    closed: bool,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ends the exchange if the submit future is dropped mid-exchange
///
/// An abandoned exchange on an open session still gets its assistant
/// message: the fallback placeholder, with an advisory explaining why.
struct PendingGuard {
    state: Arc<Mutex<SessionState>>,
    ticket: u64,
    armed: bool,
}

impl PendingGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(&self.state);
        if state.closed || state.pending != Some(self.ticket) {
            return;
        }
        state
            .transcript
            .append(NewMessage::error_placeholder(FALLBACK_ANSWER));
        state.advisory = Some(ABANDONED_REASON.to_string());
        state.pending = None;
        tracing::debug!(ticket = self.ticket, "Exchange abandoned before completion");
    }
}

/// One course chat session
pub struct ChatSession {
    id: Uuid,
    context: CourseContext,
    service: Arc<dyn QaService>,
    state: Arc<Mutex<SessionState>>,
    progress: ProgressIndicator,
    exchange_timeout: Duration,
}

impl ChatSession {
    pub fn new(
        service: Arc<dyn QaService>,
        context: CourseContext,
        options: SessionOptions,
    ) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(
            session_id = %id,
            course_id = ?context.course_id(),
            subject = %context.subject(),
            "Chat session opened"
        );
        Self {
            id,
            context,
            service,
            state: Arc::new(Mutex::new(SessionState::default())),
            progress: ProgressIndicator::new(options.typing_interval),
            exchange_timeout: options.exchange_timeout,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &CourseContext {
        &self.context
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Copy of the transcript
    pub fn transcript(&self) -> Transcript {
        lock(&self.state).transcript.clone()
    }

    /// Reads the transcript in place
    pub fn with_transcript<R>(&self, f: impl FnOnce(&Transcript) -> R) -> R {
        f(&lock(&self.state).transcript)
    }

    /// Latest failure reason, kept apart from the transcript
    pub fn advisory(&self) -> Option<String> {
        lock(&self.state).advisory.clone()
    }

    pub fn dismiss_advisory(&self) {
        lock(&self.state).advisory = None;
    }

    /// Typing indicator phases; `None` when nothing is pending
    pub fn progress(&self) -> watch::Receiver<Option<usize>> {
        self.progress.subscribe()
    }

    /// Discards the session
    ///
    /// Later submits are refused, the typing indicator stops at once and an
    /// in-flight exchange completes without touching the transcript.
    pub fn close(&self) {
        {
            let mut state = lock(&self.state);
            if state.closed {
                return;
            }
            state.closed = true;
            state.pending = None;
            tracing::info!(session_id = %self.id, messages = state.transcript.len(), "Chat session closed");
        }
        self.progress.stop();
    }

    /// Runs one exchange for `question`
    ///
    /// The trimmed question is appended before the request is sent. On
    /// success the answer and its sources are appended; on any failure
    /// (transport, status, malformed body, timeout) the
    /// [`FALLBACK_ANSWER`] placeholder is appended and the reason is stored
    /// as the advisory. The pending flag is cleared in every case.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] without side effects when the question is
    /// blank, another exchange is pending, or the session is closed
    pub async fn submit(&self, question: &str) -> Result<ExchangeOutcome, SubmitError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }

        let (ticket, question_id) = {
            let mut state = lock(&self.state);
            if state.closed {
                return Err(SubmitError::SessionClosed);
            }
            if state.pending.is_some() {
                tracing::debug!(session_id = %self.id, "Submit rejected: exchange pending");
                return Err(SubmitError::ExchangePending);
            }
            let question_id = state.transcript.append(NewMessage::user(question)).id();
            state.last_ticket += 1;
            state.pending = Some(state.last_ticket);
            state.advisory = None;
            (state.last_ticket, question_id)
        };

        let mut pending = PendingGuard {
            state: Arc::clone(&self.state),
            ticket,
            armed: true,
        };
        let typing = self.progress.start();

        let request = self.context.request(question);
        let result = match tokio::time::timeout(self.exchange_timeout, self.service.ask(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AitaError::Timeout(self.exchange_timeout).into()),
        };

        typing.stop();
        pending.disarm();

        let mut state = lock(&self.state);
        if state.closed || state.pending != Some(ticket) {
            tracing::debug!(session_id = %self.id, ticket, "Discarding completion for closed session");
            return Ok(ExchangeOutcome::Discarded {
                question: question_id,
            });
        }

        let outcome = match result {
            Ok(answer) => {
                let message = state
                    .transcript
                    .append(NewMessage::answer(answer.text, answer.sources))
                    .clone();
                tracing::info!(
                    session_id = %self.id,
                    answer_id = %message.id(),
                    sources = message.sources().len(),
                    "Exchange answered"
                );
                ExchangeOutcome::Answered {
                    question: question_id,
                    answer: message,
                }
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "Exchange failed");
                let reason = format!("Failed to get response: {}", err);
                let placeholder = state
                    .transcript
                    .append(NewMessage::error_placeholder(FALLBACK_ANSWER))
                    .clone();
                state.advisory = Some(reason.clone());
                ExchangeOutcome::Failed {
                    question: question_id,
                    placeholder,
                    reason,
                }
            }
        };
        state.pending = None;
        Ok(outcome)
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
