//! AITA - AI teaching assistant client library
//!
//! This library provides the conversational session client of the AI
//! teaching assistant: a transcript of the conversation, a session
//! controller that runs one question/answer exchange at a time against the
//! Q&A service, and a typing indicator shown while an answer is pending.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Transcript store, session controller and progress indicator
//! - `services`: HTTP clients for the Q&A service, authentication and courses
//! - `account`: Roles, the authenticated session and `AuthState`
//! - `navigation`: Role-gated route resolution
//! - `credentials`: Keyring persistence of the signed-in session
//! - `commands`: CLI command handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use aita::services::HttpQaService;
//! use aita::session::{ChatSession, CourseContext, SessionOptions};
//! use aita::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let service = Arc::new(HttpQaService::new(&config.api)?);
//!     let session = ChatSession::new(
//!         service,
//!         CourseContext::for_course("12", "physics"),
//!         SessionOptions::from(&config.chat),
//!     );
//!     let outcome = session.submit("What is Newton's second law?").await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod navigation;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use account::{AuthSession, AuthState, Role};
pub use config::Config;
pub use error::{AitaError, Result};
pub use navigation::{resolve, Route};
pub use session::{ChatSession, CourseContext, ExchangeOutcome, Message, Transcript};
