//! Configuration module for DriveMirror.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, saving, validation, defaults, and a builder pattern for
//! programmatic use.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, RelativePath};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for DriveMirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub drive: DriveConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local directory that tracked paths are relative to.
    pub base_dir: PathBuf,
    /// Name of the top-level remote folder everything is mirrored under.
    pub backup_folder: String,
    /// Paths (relative to `base_dir`) the user has opted into mirroring.
    pub tracked_paths: Vec<String>,
}

/// Google Drive API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Base URL for metadata requests.
    pub api_base_url: String,
    /// Base URL for content uploads.
    pub upload_base_url: String,
    /// Number of entries requested per listing page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Authentication settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Keyring account holding the access token. `None` means the token is
    /// read from the `DRIVEMIRROR_ACCESS_TOKEN` environment variable.
    pub account: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading and saving
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the configuration as YAML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivemirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("drivemirror")
            .join("config.yaml")
    }

    /// `sync.base_dir` with a leading `~` expanded to the home directory.
    pub fn base_dir(&self) -> PathBuf {
        expand_tilde(&self.sync.base_dir)
    }

    /// Parsed `sync.tracked_paths`.
    pub fn tracked_paths(&self) -> Result<Vec<RelativePath>, DomainError> {
        self.sync
            .tracked_paths
            .iter()
            .map(|p| RelativePath::new(p.as_str()))
            .collect()
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default name of the top-level remote folder.
pub const DEFAULT_BACKUP_FOLDER: &str = "DriveMirror Backup";

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("~"),
            backup_folder: DEFAULT_BACKUP_FOLDER.to_string(),
            tracked_paths: Vec::new(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            page_size: 100,
            request_timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"drive.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest page size the Drive API accepts.
const MAX_PAGE_SIZE: u32 = 1000;

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        let base_dir = self.base_dir();
        if !base_dir.is_dir() {
            errors.push(ValidationError {
                field: "sync.base_dir".into(),
                message: format!("directory does not exist: {}", base_dir.display()),
            });
        }
        if self.sync.backup_folder.trim().is_empty() {
            errors.push(ValidationError {
                field: "sync.backup_folder".into(),
                message: "must not be empty".into(),
            });
        } else if self.sync.backup_folder.contains('/') {
            errors.push(ValidationError {
                field: "sync.backup_folder".into(),
                message: "must be a single folder name without '/'".into(),
            });
        }

        let mut seen = HashSet::new();
        for (idx, raw) in self.sync.tracked_paths.iter().enumerate() {
            match RelativePath::new(raw.as_str()) {
                Ok(path) => {
                    if !seen.insert(path.clone()) {
                        errors.push(ValidationError {
                            field: format!("sync.tracked_paths[{idx}]"),
                            message: format!("duplicate tracked path '{path}'"),
                        });
                    }
                }
                Err(e) => errors.push(ValidationError {
                    field: format!("sync.tracked_paths[{idx}]"),
                    message: e.to_string(),
                }),
            }
        }

        // --- drive ---
        for (field, url) in [
            ("drive.api_base_url", &self.drive.api_base_url),
            ("drive.upload_base_url", &self.drive.upload_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("must be an http(s) URL, got '{url}'"),
                });
            }
        }
        if self.drive.page_size == 0 || self.drive.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "drive.page_size".into(),
                message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if self.drive.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "drive.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // --- auth ---
        if let Some(account) = &self.auth.account {
            if account.trim().is_empty() {
                errors.push(ValidationError {
                    field: "auth.account".into(),
                    message: "must not be empty when set".into(),
                });
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use drivemirror_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_base_dir(PathBuf::from("/home/user"))
///     .sync_track("Documents")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.config.sync.base_dir = base_dir;
        self
    }

    pub fn sync_backup_folder(mut self, name: impl Into<String>) -> Self {
        self.config.sync.backup_folder = name.into();
        self
    }

    pub fn sync_track(mut self, path: impl Into<String>) -> Self {
        self.config.sync.tracked_paths.push(path.into());
        self
    }

    // --- drive ---

    pub fn drive_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.drive.api_base_url = url.into();
        self
    }

    pub fn drive_upload_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.drive.upload_base_url = url.into();
        self
    }

    pub fn drive_page_size(mut self, page_size: u32) -> Self {
        self.config.drive.page_size = page_size;
        self
    }

    pub fn drive_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.drive.request_timeout_secs = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- auth ---

    pub fn auth_account(mut self, account: impl Into<String>) -> Self {
        self.config.auth.account = Some(account.into());
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
