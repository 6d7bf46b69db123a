//! Account and authentication state
//!
//! The signed-in account is an explicit [`AuthState`] value that command
//! handlers receive as an argument; nothing reads role information from
//! ambient global state.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Teacher => write!(f, "teacher"),
        }
    }
}

impl Role {
    /// Parse a role from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use aita::account::Role;
    ///
    /// assert_eq!(Role::parse_str("Teacher").unwrap(), Role::Teacher);
    /// assert!(Role::parse_str("admin").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(format!("Unknown role: {} (expected student or teacher)", other)),
        }
    }

    /// Colored tag for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Student => format!("[{}]", "STUDENT".cyan()),
            Self::Teacher => format!("[{}]", "TEACHER".green()),
        }
    }
}

/// Account details returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// An authenticated session: the bearer credential plus its account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl AuthSession {
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// The token never appears in logs or debug output
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Whether anyone is signed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(AuthSession),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(AuthSession::role)
    }
}
