//! Command-line interface definition for AITA
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication and course chat sessions.

use clap::{Parser, Subcommand};

/// AITA - AI teaching assistant client
///
/// Sign in, open a course chat and ask questions grounded in the
/// course material.
#[derive(Parser, Debug, Clone)]
#[command(name = "aita")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend (auth/courses) base URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Override the Q&A service base URL
    #[arg(long, global = true)]
    pub chat_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for AITA
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and store the session credential
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "AITA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session credential
    Signup {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (at least 6 characters)
        #[arg(short, long, env = "AITA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Account role: student or teacher
        #[arg(short, long, default_value = "student")]
        role: String,
    },

    /// Forget the stored session credential
    Logout,

    /// Show the signed-in account and its home view
    Whoami,

    /// Start an interactive chat session
    Chat {
        /// Course to ground the session in (omit for a general session)
        #[arg(long)]
        course: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// Course to ground the question in
        #[arg(long)]
        course: Option<String>,

        /// The question text
        question: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            backend_url: None,
            chat_url: None,
            command: Commands::Whoami,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_cli_parse_chat_without_course() {
        let cli = Cli::try_parse_from(["aita", "chat"]).unwrap();
        if let Commands::Chat { course } = cli.command {
            assert_eq!(course, None);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_chat_with_course() {
        let cli = Cli::try_parse_from(["aita", "chat", "--course", "c1"]).unwrap();
        if let Commands::Chat { course } = cli.command {
            assert_eq!(course, Some("c1".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from([
            "aita",
            "ask",
            "--course",
            "c1",
            "What is Newton's second law?",
        ])
        .unwrap();
        if let Commands::Ask { course, question } = cli.command {
            assert_eq!(course, Some("c1".to_string()));
            assert_eq!(question, "What is Newton's second law?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_signup_default_role() {
        let cli = Cli::try_parse_from([
            "aita",
            "signup",
            "--email",
            "a@b.edu",
            "--password",
            "secret1",
        ])
        .unwrap();
        if let Commands::Signup { role, .. } = cli.command {
            assert_eq!(role, "student");
        } else {
            panic!("Expected Signup command");
        }
    }

    #[test]
    fn test_cli_global_url_overrides() {
        let cli = Cli::try_parse_from(["aita", "whoami", "--chat-url", "http://localhost:9999"])
            .unwrap();
        assert_eq!(cli.chat_url, Some("http://localhost:9999".to_string()));
    }

    #[test]
    fn test_cli_ask_requires_question() {
        assert!(Cli::try_parse_from(["aita", "ask"]).is_err());
    }
}
