//! Configuration management for AITA
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AitaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for AITA
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Collaborator service endpoints
    #[serde(default)]
    pub api: ApiConfig,
    /// Chat session behavior
    #[serde(default)]
    pub chat: ChatConfig,
    /// Where the bearer credential is kept between invocations
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Endpoints of the backend and the Q&A service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the course/auth backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Base URL of the Q&A (chat) service
    #[serde(default = "default_chat_url")]
    pub chat_url: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_chat_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_request_timeout() -> u64 {
    90
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            chat_url: default_chat_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Deadline for one question/answer exchange (seconds)
    #[serde(default = "default_exchange_timeout")]
    pub exchange_timeout_seconds: u64,

    /// Period of the typing indicator animation (milliseconds)
    #[serde(default = "default_typing_interval")]
    pub typing_interval_ms: u64,

    /// Subject sent with ungrounded sessions
    #[serde(default = "default_subject")]
    pub default_subject: String,
}

fn default_exchange_timeout() -> u64 {
    60
}

fn default_typing_interval() -> u64 {
    750
}

fn default_subject() -> String {
    "generic".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            exchange_timeout_seconds: default_exchange_timeout(),
            typing_interval_ms: default_typing_interval(),
            default_subject: default_subject(),
        }
    }
}

impl ChatConfig {
    /// Exchange deadline as a `Duration`
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_seconds)
    }

    /// Typing indicator period as a `Duration`
    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms)
    }
}

/// Keyring entry used to persist the authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Keyring service name
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Keyring user/account name
    #[serde(default = "default_keyring_user")]
    pub keyring_user: String,
}

fn default_keyring_service() -> String {
    "aita".to_string()
}

fn default_keyring_user() -> String {
    "session".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            keyring_user: default_keyring_user(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AitaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AitaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("AITA_BACKEND_URL") {
            tracing::debug!(backend_url = %url, "Env override: AITA_BACKEND_URL");
            self.api.backend_url = url;
        }

        if let Ok(url) = std::env::var("AITA_CHAT_URL") {
            tracing::debug!(chat_url = %url, "Env override: AITA_CHAT_URL");
            self.api.chat_url = url;
        }

        if let Ok(timeout) = std::env::var("AITA_REQUEST_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(v) => self.api.request_timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid AITA_REQUEST_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(timeout) = std::env::var("AITA_EXCHANGE_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(v) => self.chat.exchange_timeout_seconds = v,
                Err(_) => tracing::warn!("Invalid AITA_EXCHANGE_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(interval) = std::env::var("AITA_TYPING_INTERVAL_MS") {
            match interval.parse() {
                Ok(v) => self.chat.typing_interval_ms = v,
                Err(_) => tracing::warn!("Invalid AITA_TYPING_INTERVAL_MS: {}", interval),
            }
        }

        if let Ok(subject) = std::env::var("AITA_DEFAULT_SUBJECT") {
            self.chat.default_subject = subject;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.backend_url {
            self.api.backend_url = url.clone();
        }
        if let Some(url) = &cli.chat_url {
            self.api.chat_url = url.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if a URL does not parse as http(s), a timeout or interval
    /// is zero, or the default subject is empty
    pub fn validate(&self) -> Result<()> {
        validate_http_url("api.backend_url", &self.api.backend_url)?;
        validate_http_url("api.chat_url", &self.api.chat_url)?;

        if self.api.request_timeout_seconds == 0 {
            return Err(AitaError::Config(
                "api.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.exchange_timeout_seconds == 0 {
            return Err(AitaError::Config(
                "chat.exchange_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.typing_interval_ms == 0 {
            return Err(AitaError::Config(
                "chat.typing_interval_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.default_subject.trim().is_empty() {
            return Err(
                AitaError::Config("chat.default_subject cannot be empty".to_string()).into(),
            );
        }

        if self.credentials.keyring_service.is_empty() || self.credentials.keyring_user.is_empty()
        {
            return Err(AitaError::Config(
                "credentials.keyring_service and keyring_user cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| AitaError::Config(format!("{} is not a valid URL ({}): {}", field, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AitaError::Config(format!(
            "{} must use http or https, got {}",
            field, other
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.backend_url, "http://localhost:8000");
        assert_eq!(config.api.chat_url, "http://localhost:8001");
        assert_eq!(config.chat.exchange_timeout_seconds, 60);
        assert_eq!(config.chat.typing_interval_ms, 750);
        assert_eq!(config.chat.default_subject, "generic");
        assert_eq!(config.credentials.keyring_service, "aita");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.api.chat_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.chat_url"));
    }

    #[test]
    fn test_config_validation_non_http_scheme() {
        let mut config = Config::default();
        config.api.backend_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_config_validation_zero_exchange_timeout() {
        let mut config = Config::default();
        config.chat.exchange_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_typing_interval() {
        let mut config = Config::default();
        config.chat.typing_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_subject() {
        let mut config = Config::default();
        config.chat.default_subject = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  backend_url: "https://aita.example.edu"
  chat_url: "https://chat.aita.example.edu"
chat:
  exchange_timeout_seconds: 15
  typing_interval_ms: 500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.backend_url, "https://aita.example.edu");
        assert_eq!(config.api.request_timeout_seconds, 90);
        assert_eq!(config.chat.exchange_timeout(), Duration::from_secs(15));
        assert_eq!(config.chat.typing_interval(), Duration::from_millis(500));
        assert_eq!(config.chat.default_subject, "generic");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.chat.typing_interval_ms, 750);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = Cli::default();
        let config = Config::load("/nonexistent/aita/config.yaml", &cli).unwrap();
        assert_eq!(config.api.chat_url, "http://localhost:8001");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("AITA_CHAT_URL", "http://chat.test:9000");
        std::env::set_var("AITA_EXCHANGE_TIMEOUT_SECONDS", "5");
        std::env::set_var("AITA_TYPING_INTERVAL_MS", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("AITA_CHAT_URL");
        std::env::remove_var("AITA_EXCHANGE_TIMEOUT_SECONDS");
        std::env::remove_var("AITA_TYPING_INTERVAL_MS");

        assert_eq!(config.api.chat_url, "http://chat.test:9000");
        assert_eq!(config.chat.exchange_timeout_seconds, 5);
        assert_eq!(config.chat.typing_interval_ms, 750);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut cli = Cli::default();
        cli.chat_url = Some("http://override:1".to_string());
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.api.chat_url, "http://override:1");
        assert_eq!(config.api.backend_url, "http://localhost:8000");
    }
}
