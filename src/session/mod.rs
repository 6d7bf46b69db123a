//! Conversational session core
//!
//! - `transcript`: append-only message log
//! - `controller`: the exchange state machine around the Q&A service
//! - `progress`: the typing indicator and its scoped timer

pub mod controller;
pub mod progress;
pub mod transcript;

pub use controller::{
    ChatSession, CourseContext, ExchangeOutcome, SessionOptions, SubmitError, ABANDONED_REASON,
    FALLBACK_ANSWER,
};
pub use progress::{ProgressIndicator, TypingGuard};
pub use transcript::{Message, MessageId, MessageStatus, NewMessage, Sender, Source, Transcript};
