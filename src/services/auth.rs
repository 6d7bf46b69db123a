//! Login and signup against the backend
//!
//! Token issuance belongs to the backend; this client only exchanges
//! credentials for an [`AuthSession`].

use crate::account::{AuthSession, Role};
use crate::config::ApiConfig;
use crate::error::{AitaError, Result};
use crate::services::{build_client, detail_from_body};

use reqwest::Client;
use serde::Serialize;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Signup form contents
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignupRequest {
    /// Checks the form before anything is sent
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty email or a password shorter
    /// than [`MIN_PASSWORD_LEN`] characters
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(AitaError::Validation("Email is required".to_string()).into());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AitaError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))
            .into());
        }
        Ok(())
    }
}

/// Client for `/api/auth/*`
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_seconds)?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges email and password for a session
    ///
    /// # Errors
    ///
    /// Returns an authentication error carrying the backend's `detail`
    /// message when the credentials are rejected
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(
                AitaError::Validation("Email and password are required".to_string()).into(),
            );
        }

        tracing::info!(email = %email, "Logging in");
        self.post_credentials(
            "/api/auth/login",
            &LoginRequest { email, password },
            "Login failed",
        )
        .await
    }

    /// Creates an account and returns its session
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the backend if the form
    /// is invalid, otherwise an authentication error on rejection
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthSession> {
        request.validate()?;
        tracing::info!(email = %request.email, role = %request.role, "Signing up");
        self.post_credentials("/api/auth/signup", request, "Signup failed")
            .await
    }

    async fn post_credentials<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthSession> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            tracing::error!("Auth request failed: {}", e);
            AitaError::Authentication(format!("{}: {}", fallback, e))
        })?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let reason = detail_from_body(&text).unwrap_or_else(|| fallback.to_string());
            tracing::warn!("Auth request rejected with {}: {}", status, reason);
            return Err(AitaError::Authentication(reason).into());
        }

        let session: AuthSession = serde_json::from_str(&text).map_err(|e| {
            AitaError::Authentication(format!("Unexpected response from backend: {}", e))
        })?;
        tracing::info!(user_id = session.user.id, role = %session.user.role, "Signed in");
        Ok(session)
    }
}
