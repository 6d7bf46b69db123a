//! Append-only transcript of one chat session
//!
//! The transcript is the ordered log of exchanged messages. Its only mutation
//! is [`Transcript::append`], which assigns the next message id and pushes at
//! the tail; entries are never edited, reordered or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of a message within its session
///
/// Ids start at 1 and are strictly increasing in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Numeric value of the id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Whether a message is a real answer or a placeholder for a failed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Final,
    Error,
}

/// A provenance label attached to an assistant answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub label: String,
}

impl Source {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// A message as stored in the transcript
///
/// Fields are private; a `Message` can only be produced by appending a
/// [`NewMessage`] to a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    sources: Vec<Source>,
    status: MessageStatus,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_error(&self) -> bool {
        self.status == MessageStatus::Error
    }
}

/// A message draft, not yet assigned an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    sender: Sender,
    text: String,
    sources: Vec<Source>,
    status: MessageStatus,
}

impl NewMessage {
    /// A question typed by the user; user messages never carry sources
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            sources: Vec::new(),
            status: MessageStatus::Final,
        }
    }

    /// A successful answer from the Q&A service
    pub fn answer(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            sources,
            status: MessageStatus::Final,
        }
    }

    /// The placeholder substituted for a failed exchange
    pub fn error_placeholder(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            sources: Vec::new(),
            status: MessageStatus::Error,
        }
    }
}

/// Ordered, append-only message log
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    /// Creates an empty transcript
    ///
    /// # Examples
    ///
    /// ```
    /// use aita::session::{NewMessage, Transcript};
    ///
    /// let mut transcript = Transcript::new();
    /// let id = transcript.append(NewMessage::user("Hello")).id();
    /// assert_eq!(id.get(), 1);
    /// assert_eq!(transcript.len(), 1);
    /// ```
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// Assigns the next id to `draft` and appends it at the tail
    pub fn append(&mut self, draft: NewMessage) -> &Message {
        // Default::default() leaves next_id at 0; ids must start at 1
        let id = MessageId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        self.messages.push(Message {
            id,
            sender: draft.sender,
            text: draft.text,
            sources: draft.sources,
            status: draft.status,
            created_at: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Looks up a message by id
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // ids are strictly increasing, so binary search by id is valid
        self.messages
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
