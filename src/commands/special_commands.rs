//! Special commands parser for interactive chat
//!
//! Special commands are entered at the chat prompt instead of a question.
//! They inspect the session (status, sources, history), dismiss the failure
//! banner, or end the session. Commands are prefixed with `/` and are
//! case-insensitive; bare `exit` and `quit` are accepted too.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command does not take an argument but one was given
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Commands handled by the chat view rather than sent as questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show course, pending state and transcript size
    ShowStatus,

    /// List the citations of the latest answer
    ShowSources,

    /// Reprint the whole transcript
    ShowHistory,

    /// Hide the failure banner
    DismissAdvisory,

    /// Display help information
    Help,

    /// End the session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a line of chat input
///
/// # Errors
///
/// Returns [`CommandError`] for unknown `/` commands or arguments given to
/// commands that take none
///
/// # Examples
///
/// ```
/// use aita::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/status").unwrap(), SpecialCommand::ShowStatus);
/// assert_eq!(parse_special_command("What is F?").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match lower.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (lower.as_str(), ""),
    };

    let parsed = match command {
        "/status" => SpecialCommand::ShowStatus,
        "/sources" => SpecialCommand::ShowSources,
        "/history" => SpecialCommand::ShowHistory,
        "/dismiss" => SpecialCommand::DismissAdvisory,
        "/help" | "/?" => SpecialCommand::Help,
        "/exit" | "/quit" | "exit" | "quit" => SpecialCommand::Exit,
        _ => return Err(CommandError::UnknownCommand(trimmed.to_string())),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        });
    }

    Ok(parsed)
}

/// Print help for the chat prompt
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /status   - Show the course, pending state and number of messages
  /sources  - List the sources cited by the latest answer
  /history  - Reprint the conversation so far
  /dismiss  - Hide the last error banner
  /help     - Show this help
  /exit     - End the session (also: /quit, exit, quit)

Anything else is sent to the teaching assistant as a question.
"#
    );
}
