//! CLI subcommands and the wiring they share

pub mod auth;
pub mod completions;
pub mod config;
pub mod plan;
pub mod status;
pub mod sync;
pub mod track;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use drivemirror_core::config::Config;
use drivemirror_core::domain::{RelativePath, SizeUnit, SyncAction};
use drivemirror_drive::{credentials, DriveClient, DriveRemoteStore};
use drivemirror_sync::{SyncEngine, SyncSettings};
use tracing::info;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global options every command runs with
#[derive(Debug, Clone)]
pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
}

impl CliContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// The config file if present, defaults otherwise; a file that exists
    /// but does not parse is an error
    pub fn load_config(&self) -> Result<Config> {
        if self.config_path.exists() {
            Config::load(&self.config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// [`Self::load_config`] followed by validation
    pub fn load_valid_config(&self) -> Result<Config> {
        let config = self.load_config()?;
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!(
                "Invalid configuration ({}): {}",
                self.config_path.display(),
                messages.join("; ")
            );
        }
        Ok(config)
    }
}

/// Build an engine backed by Google Drive from `config`
pub fn build_engine(config: &Config) -> Result<SyncEngine> {
    let creds = credentials::from_auth_config(&config.auth);
    let client = DriveClient::from_config(&config.drive, creds)
        .context("Failed to create Drive client")?;
    let store = Arc::new(DriveRemoteStore::from_config(&config.drive, client));
    let settings = SyncSettings::from(config);

    info!(
        base_dir = %settings.base_dir.display(),
        backup_folder = %settings.backup_folder,
        "Created sync engine"
    );
    SyncEngine::new(store, &settings).context("Failed to create sync engine")
}

/// Paths given on the command line, or the configured tracked paths
pub fn select_paths(config: &Config, args: &[String]) -> Result<Vec<RelativePath>> {
    if args.is_empty() {
        return config
            .tracked_paths()
            .context("Invalid entry in sync.tracked_paths");
    }
    args.iter()
        .map(|p| RelativePath::new(p.as_str()).with_context(|| format!("Invalid path '{p}'")))
        .collect()
}

/// What `plan` and `sync` work on
///
/// `tracked` is always the full configured list, since top-level deletions
/// are computed against it. `selected` narrows planning to the paths given
/// on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanScope {
    pub tracked: Vec<RelativePath>,
    pub selected: Vec<RelativePath>,
}

impl PlanScope {
    pub fn new(config: &Config, args: &[String]) -> Result<Self> {
        let tracked = config
            .tracked_paths()
            .context("Invalid entry in sync.tracked_paths")?;
        let selected = select_paths(config, args)?;
        Ok(Self { tracked, selected })
    }
}

/// Local path of an upload action, file name otherwise
pub fn action_target(action: &SyncAction) -> String {
    action
        .local_path()
        .map(ToString::to_string)
        .unwrap_or_else(|| action.filename().to_string())
}

/// `"1.50 MB"`-style rendering of a byte count
pub fn human_bytes(bytes: u64) -> String {
    let unit = SizeUnit::for_size(bytes);
    format!("{:.2} {}", unit.convert(bytes), unit)
}
