/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: interactive course chat
- `ask`: single question, answer printed to stdout
- `auth`: login, signup, logout and whoami

Handlers receive the configuration and the current `AuthState` explicitly and
build the session and service clients they need.
*/

use crate::account::AuthState;
use crate::config::Config;
use crate::error::{AitaError, Result};
use crate::navigation::{resolve, Route};
use crate::services::CourseDirectory;
use crate::session::progress::render_phase;
use crate::session::{
    ChatSession, CourseContext, ExchangeOutcome, Message, MessageStatus, Sender, SubmitError,
};

use colored::Colorize;
use std::io::Write;

// Special commands parser for the chat prompt
pub mod special_commands;

/// Context and display title of the session to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub context: CourseContext,
    pub title: String,
}

/// Resolves what a new chat session is grounded in
///
/// Without a course id the session is ungrounded and uses the configured
/// default subject. With one, the course chat route must be reachable for
/// `auth` and the course is looked up in `directory`.
///
/// # Errors
///
/// Returns a credential error when nobody is signed in, or the directory's
/// error when the course cannot be resolved
pub async fn open_session_target(
    config: &Config,
    auth: &AuthState,
    course_id: Option<&str>,
    directory: &dyn CourseDirectory,
) -> Result<SessionTarget> {
    let Some(course_id) = course_id else {
        return Ok(SessionTarget {
            context: CourseContext::ungrounded(config.chat.default_subject.clone()),
            title: "General session".to_string(),
        });
    };

    let requested = Route::CourseChat {
        course_id: course_id.to_string(),
    };
    let resolved = resolve(requested.clone(), auth);
    let session = match (auth.session(), resolved == requested) {
        (Some(session), true) => session,
        _ => {
            return Err(AitaError::Credentials(format!(
                "Course chats require a signed-in account (redirected to {}). Run `aita login` first",
                resolved
            ))
            .into())
        }
    };

    let course = directory.course(session, course_id).await?;
    Ok(SessionTarget {
        context: CourseContext::from(&course),
        title: course.name,
    })
}

/// Submits `question` while drawing the typing indicator on stderr
pub async fn submit_with_indicator(
    session: &ChatSession,
    question: &str,
) -> std::result::Result<ExchangeOutcome, SubmitError> {
    let mut progress = session.progress();
    let submit = session.submit(question);
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            changed = progress.changed() => {
                if changed.is_err() {
                    break submit.await;
                }
                let phase = *progress.borrow_and_update();
                draw_phase(phase);
            }
        }
    };
    draw_phase(None);
    outcome
}

fn draw_phase(phase: Option<usize>) {
    let mut stderr = std::io::stderr();
    let _ = match phase {
        Some(p) => write!(stderr, "\r{:<6}", render_phase(p)),
        None => write!(stderr, "\r{:<6}\r", ""),
    };
    let _ = stderr.flush();
}

/// Prints one transcript message
pub fn print_message(message: &Message) {
    match (message.sender(), message.status()) {
        (Sender::User, _) => {
            println!("{} {}", "You:".bold().blue(), message.text());
        }
        (Sender::Assistant, MessageStatus::Error) => {
            println!("{} {}", "AITA:".bold().red(), message.text().red());
        }
        (Sender::Assistant, MessageStatus::Final) => {
            println!("{}\n{}", "AITA:".bold().green(), message.text());
            print_sources(message);
        }
    }
    println!();
}

fn print_sources(message: &Message) {
    if message.sources().is_empty() {
        return;
    }
    println!("{}", "Sources:".bright_black());
    for source in message.sources() {
        println!("  {} {}", "-".bright_black(), source.label);
    }
}

fn print_advisory(reason: &str) {
    eprintln!("{}", reason.on_red().white());
}

// Interactive chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Opens one session, reads questions with rustyline and renders every
    //! exchange. While an exchange is pending no input is read, so the user
    //! cannot submit twice.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::services::{HttpCourseDirectory, HttpQaService};
    use crate::session::SessionOptions;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::sync::Arc;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `auth` - Current authentication state
    /// * `course_id` - Course to ground the session in, if any
    pub async fn run_chat(config: Config, auth: AuthState, course_id: Option<String>) -> Result<()> {
        let directory = HttpCourseDirectory::new(&config.api)?;
        let target = open_session_target(&config, &auth, course_id.as_deref(), &directory).await?;

        let service = Arc::new(HttpQaService::new(&config.api)?);
        let session = ChatSession::new(service, target.context.clone(), SessionOptions::from(&config.chat));

        let mut rl = DefaultEditor::new()?;
        print_welcome_banner(&target, &auth);

        loop {
            match rl.readline(&format!("{} ", ">>".cyan())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&session, &target);
                            continue;
                        }
                        Ok(SpecialCommand::ShowSources) => {
                            print_latest_sources(&session);
                            continue;
                        }
                        Ok(SpecialCommand::ShowHistory) => {
                            session.with_transcript(|t| t.iter().for_each(print_message));
                            continue;
                        }
                        Ok(SpecialCommand::DismissAdvisory) => {
                            session.dismiss_advisory();
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().yellow());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    match submit_with_indicator(&session, trimmed).await {
                        Ok(ExchangeOutcome::Answered { answer, .. }) => print_message(&answer),
                        Ok(ExchangeOutcome::Failed {
                            placeholder,
                            reason,
                            ..
                        }) => {
                            print_advisory(&reason);
                            print_message(&placeholder);
                        }
                        Ok(ExchangeOutcome::Discarded { .. }) => break,
                        Err(e) => eprintln!("{}", e.to_string().yellow()),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        session.close();
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(target: &SessionTarget, auth: &AuthState) {
        println!();
        println!("{}", target.title.bold());
        println!("{}", "AI Teaching Assistant".bright_black());
        if let Some(session) = auth.session() {
            println!("Signed in as {} {}", session.user.email, session.role().colored_tag());
        }
        println!(
            "Ask me anything about {}! Type '/help' for commands.\n",
            target.title
        );
    }

    fn print_status(session: &ChatSession, target: &SessionTarget) {
        let context = session.context();
        println!("Course:   {}", target.title);
        println!("Subject:  {}", context.subject());
        if let Some(id) = context.course_id() {
            println!("Course id: {}", id);
        }
        println!("Messages: {}", session.with_transcript(|t| t.len()));
        println!("Pending:  {}", session.is_pending());
        if let Some(advisory) = session.advisory() {
            println!("Last error: {}", advisory);
        }
        println!("Session:  {}\n", session.id());
    }

    fn print_latest_sources(session: &ChatSession) {
        session.with_transcript(|t| {
            let latest = t
                .iter()
                .rev()
                .find(|m| m.sender() == Sender::Assistant && m.status() == MessageStatus::Final);
            match latest {
                Some(message) if !message.sources().is_empty() => print_sources(message),
                Some(_) => println!("The latest answer cited no sources."),
                None => println!("No answers yet."),
            }
        });
    }
}

// Single-question command handler
pub mod ask {
    //! Asks one question and prints the answer, for scripting.

    use super::*;
    use crate::services::{HttpCourseDirectory, HttpQaService};
    use crate::session::SessionOptions;
    use std::sync::Arc;

    /// Ask a single question
    ///
    /// # Errors
    ///
    /// Returns error when the question is blank, the course cannot be opened,
    /// or the exchange fails (after printing the placeholder)
    pub async fn run_ask(
        config: Config,
        auth: AuthState,
        course_id: Option<String>,
        question: String,
    ) -> Result<()> {
        let directory = HttpCourseDirectory::new(&config.api)?;
        let target = open_session_target(&config, &auth, course_id.as_deref(), &directory).await?;

        let service = Arc::new(HttpQaService::new(&config.api)?);
        let session = ChatSession::new(service, target.context, SessionOptions::from(&config.chat));

        let outcome = session
            .submit(&question)
            .await
            .map_err(|e| AitaError::Validation(e.to_string()))?;
        session.close();

        match outcome {
            ExchangeOutcome::Answered { answer, .. } => {
                println!("{}", answer.text());
                print_sources(&answer);
                Ok(())
            }
            ExchangeOutcome::Failed {
                placeholder,
                reason,
                ..
            } => {
                println!("{}", placeholder.text());
                Err(AitaError::QaService(reason).into())
            }
            ExchangeOutcome::Discarded { .. } => {
                Err(AitaError::QaService("Session closed before the answer arrived".to_string()).into())
            }
        }
    }
}

// Account command handlers
pub mod auth {
    //! Login, signup, logout and whoami.

    use super::*;
    use crate::account::Role;
    use crate::credentials::CredentialStore;
    use crate::navigation::home_route;
    use crate::services::{AuthClient, SignupRequest};

    /// Sign in and store the session
    pub async fn login(config: Config, email: String, password: String) -> Result<()> {
        let client = AuthClient::new(&config.api)?;
        let session = client.login(&email, &password).await?;
        CredentialStore::new(&config.credentials).save(&session)?;
        println!(
            "Signed in as {} {}. Home: {}",
            session.user.email,
            session.role().colored_tag(),
            home_route(session.role())
        );
        Ok(())
    }

    /// Create an account, then store its session
    pub async fn signup(config: Config, email: String, password: String, role: String) -> Result<()> {
        let role = Role::parse_str(&role).map_err(AitaError::Validation)?;
        let client = AuthClient::new(&config.api)?;
        let session = client
            .signup(&SignupRequest {
                email,
                password,
                role,
            })
            .await?;
        CredentialStore::new(&config.credentials).save(&session)?;
        println!(
            "Account created for {} {}. Home: {}",
            session.user.email,
            session.role().colored_tag(),
            home_route(session.role())
        );
        Ok(())
    }

    /// Forget the stored session
    pub fn logout(config: Config) -> Result<()> {
        CredentialStore::new(&config.credentials).clear()?;
        println!("Signed out.");
        Ok(())
    }

    /// Describe the current authentication state
    pub fn whoami(auth: &AuthState) {
        match auth.session() {
            Some(session) => println!(
                "{} {} (home: {})",
                session.user.email,
                session.role().colored_tag(),
                resolve(Route::Landing, auth)
            ),
            None => println!("Not signed in (home: {})", resolve(Route::Landing, auth)),
        }
    }
}
