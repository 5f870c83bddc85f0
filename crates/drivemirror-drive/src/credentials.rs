//! Access token sources
//!
//! Token acquisition (sign-in, refresh) happens outside DriveMirror. These
//! [`ICredentials`] implementations only hand out a token obtained elsewhere:
//!
//! - [`StaticCredentials`] - a fixed token, mostly for tests
//! - [`EnvCredentials`] - `DRIVEMIRROR_ACCESS_TOKEN` from the environment
//! - [`KeyringCredentials`] - a token stored in the system keyring

use std::sync::Arc;

use anyhow::{Context, Result};
use drivemirror_core::config::AuthConfig;
use drivemirror_core::ports::ICredentials;
use tracing::{debug, info};

use crate::DriveError;

/// Service name used for keyring entries
pub const KEYRING_SERVICE: &str = "drivemirror";

/// Environment variable read by [`EnvCredentials::new`]
pub const ACCESS_TOKEN_ENV: &str = "DRIVEMIRROR_ACCESS_TOKEN";

/// Token source selected by the `auth` configuration section
///
/// A configured account reads from the keyring, otherwise the environment.
pub fn from_auth_config(config: &AuthConfig) -> Arc<dyn ICredentials> {
    match &config.account {
        Some(account) => Arc::new(KeyringCredentials::new(account.clone())),
        None => Arc::new(EnvCredentials::new()),
    }
}

// ============================================================================
// StaticCredentials
// ============================================================================

/// A fixed access token
#[derive(Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
impl ICredentials for StaticCredentials {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

// ============================================================================
// EnvCredentials
// ============================================================================

/// Token read from an environment variable on every request
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    /// Reads [`ACCESS_TOKEN_ENV`]
    pub fn new() -> Self {
        Self::with_var(ACCESS_TOKEN_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICredentials for EnvCredentials {
    async fn access_token(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(DriveError::Credentials(format!("{} is not set", self.var)).into()),
        }
    }
}

// ============================================================================
// KeyringCredentials
// ============================================================================

/// Stores and retrieves an access token from the system keyring
///
/// Uses the `keyring` crate to keep the token in the OS credential store
/// (e.g., GNOME Keyring, KDE Wallet) under [`KEYRING_SERVICE`].
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    account: String,
}

impl KeyringCredentials {
    /// # Arguments
    /// * `account` - Keyring username the token is stored under
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account)
            .context("Failed to create keyring entry")
    }

    /// Stores `token` for this account, replacing any previous one
    pub fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keyring")?;
        debug!(account = %self.account, "Stored token in keyring");
        Ok(())
    }

    /// Loads the token for this account
    ///
    /// # Returns
    /// `None` if no token is stored
    pub fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => {
                debug!(account = %self.account, "No token found in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    /// Removes the token for this account
    ///
    /// # Returns
    /// `true` if a token was removed, `false` if none was stored
    pub fn clear(&self) -> Result<bool> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!(account = %self.account, "Cleared token from keyring");
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

#[async_trait::async_trait]
impl ICredentials for KeyringCredentials {
    async fn access_token(&self) -> Result<String> {
        let this = self.clone();
        let token = tokio::task::spawn_blocking(move || this.load())
            .await
            .context("Keyring lookup task failed")??;

        token.ok_or_else(|| {
            DriveError::Credentials(format!(
                "no token stored for account '{}'; run `drivemirror auth set-token`",
                self.account
            ))
            .into()
        })
    }
}
