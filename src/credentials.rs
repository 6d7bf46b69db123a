//! Persistence of the signed-in session in the system keyring
//!
//! The stored value is the JSON form of [`AuthSession`]. A missing or
//! unreadable entry loads as [`AuthState::Anonymous`].

use crate::account::{AuthSession, AuthState};
use crate::config::CredentialsConfig;
use crate::error::Result;

/// Keyring-backed store for the session credential
#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
    user: String,
}

impl CredentialStore {
    pub fn new(config: &CredentialsConfig) -> Self {
        Self {
            service: config.keyring_service.clone(),
            user: config.keyring_user.clone(),
        }
    }

    /// Current authentication state
    ///
    /// # Errors
    ///
    /// Returns error if the keyring itself is unavailable
    pub fn load(&self) -> Result<AuthState> {
        let entry = keyring::Entry::new(&self.service, &self.user)?;
        match entry.get_password() {
            Ok(stored) => Ok(decode_session(&stored)
                .map(AuthState::Authenticated)
                .unwrap_or_default()),
            Err(keyring::Error::NoEntry) => Ok(AuthState::Anonymous),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores `session`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns error if the keyring rejects the write
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, &self.user)?;
        entry.set_password(&serde_json::to_string(session)?)?;
        tracing::info!(user_id = session.user.id, "Stored session credential");
        Ok(())
    }

    /// Removes the stored session; a missing entry is not an error
    ///
    /// # Errors
    ///
    /// Returns error if the keyring rejects the delete
    pub fn clear(&self) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, &self.user)?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                tracing::info!("Cleared session credential");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Parses a stored session, ignoring blank or corrupt values
fn decode_session(stored: &str) -> Option<AuthSession> {
    if stored.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<AuthSession>(stored) {
        Ok(session) if !session.token.is_empty() => Some(session),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable stored session: {}", e);
            None
        }
    }
}
