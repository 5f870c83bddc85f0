//! Auth commands - Store, clear and inspect the Drive access token
//!
//! DriveMirror does not run a sign-in flow. A token obtained elsewhere is
//! kept in the system keyring under an account name:
//! 1. `set-token` - stores a token and records the account in the config
//! 2. `logout`    - clears the stored token
//! 3. `status`    - shows which token source the next sync will use

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::Subcommand;
use drivemirror_core::config::Config;
use drivemirror_drive::credentials::ACCESS_TOKEN_ENV;
use drivemirror_drive::KeyringCredentials;
use tracing::info;

use super::CliContext;

/// Keyring account used when neither `--account` nor `auth.account` is set
const DEFAULT_ACCOUNT: &str = "default";

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store an access token in the system keyring
    SetToken {
        /// Token to store; read from stdin when omitted
        token: Option<String>,
        /// Keyring account to store the token under
        #[arg(long)]
        account: Option<String>,
    },
    /// Remove the stored token
    Logout {
        /// Keyring account to clear
        #[arg(long)]
        account: Option<String>,
    },
    /// Show where the access token comes from
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            AuthCommand::SetToken { token, account } => {
                self.execute_set_token(ctx, token.as_deref(), account.as_deref())
            }
            AuthCommand::Logout { account } => self.execute_logout(ctx, account.as_deref()),
            AuthCommand::Status => self.execute_status(ctx),
        }
    }

    fn execute_set_token(
        &self,
        ctx: &CliContext,
        token: Option<&str>,
        account: Option<&str>,
    ) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config()?;

        let token = match token {
            Some(token) => token.trim().to_string(),
            None => read_token(io::stdin().lock())?,
        };
        if token.is_empty() {
            anyhow::bail!("Refusing to store an empty token");
        }

        let account = resolve_account(&config, account);
        KeyringCredentials::new(account.clone()).store(&token)?;
        info!(account = %account, "Stored access token");

        // A sync only reads the keyring when the config names an account
        let recorded = config.auth.account.is_none();
        if recorded {
            config.auth.account = Some(account.clone());
            config.save(&ctx.config_path)?;
        }

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "account": account,
                "config_updated": recorded,
            }));
        } else {
            formatter.success(&format!("Stored token for account '{account}'"));
            if recorded {
                formatter.info(&format!("Saved auth.account to {}", ctx.config_path.display()));
            }
        }
        Ok(())
    }

    fn execute_logout(&self, ctx: &CliContext, account: Option<&str>) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        let account = resolve_account(&config, account);
        let removed = KeyringCredentials::new(account.clone()).clear()?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "account": account,
                "removed": removed,
            }));
        } else if removed {
            formatter.success(&format!("Removed token for account '{account}'"));
        } else {
            formatter.info(&format!("No token stored for account '{account}'"));
        }
        Ok(())
    }

    fn execute_status(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        match &config.auth.account {
            Some(account) => {
                let present = KeyringCredentials::new(account.clone())
                    .load()
                    .map(|token| token.is_some())
                    .unwrap_or(false);

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "source": "keyring",
                        "account": account,
                        "token_present": present,
                    }));
                } else if present {
                    formatter.success(&format!("Using keyring token for account '{account}'"));
                } else {
                    formatter.error(&format!("No token stored for account '{account}'"));
                    formatter.info("Run 'drivemirror auth set-token' to store one");
                }
            }
            None => {
                let present = std::env::var(ACCESS_TOKEN_ENV)
                    .map(|v| !v.trim().is_empty())
                    .unwrap_or(false);

                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "source": "environment",
                        "variable": ACCESS_TOKEN_ENV,
                        "token_present": present,
                    }));
                } else if present {
                    formatter.success(&format!("Using token from {ACCESS_TOKEN_ENV}"));
                } else {
                    formatter.error(&format!("{ACCESS_TOKEN_ENV} is not set"));
                    formatter.info(
                        "Set it, or run 'drivemirror auth set-token' to use the keyring",
                    );
                }
            }
        }
        Ok(())
    }
}

/// `--account`, then `auth.account`, then [`DEFAULT_ACCOUNT`]
fn resolve_account(config: &Config, flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| config.auth.account.clone())
        .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string())
}

/// First line of `reader`, trimmed
fn read_token(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;
    Ok(line.trim().to_string())
}
