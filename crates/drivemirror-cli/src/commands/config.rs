//! Config command - View and manage DriveMirror configuration
//!
//! Provides the `drivemirror config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Writes a starter configuration file
//! 3. Sets individual configuration values via dot-notation keys
//! 4. Validates the configuration file and reports errors

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use drivemirror_core::config::Config;
use tracing::info;

use super::CliContext;

/// Keys accepted by `config set`, with a short description each
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("sync.base_dir", "Local directory tracked paths are relative to"),
    ("sync.backup_folder", "Top-level remote folder name"),
    ("drive.api_base_url", "Drive metadata endpoint"),
    ("drive.upload_base_url", "Drive upload endpoint"),
    ("drive.page_size", "Entries per listing page (1-1000)"),
    ("drive.request_timeout_secs", "Per-request timeout in seconds"),
    ("logging.level", "trace|debug|info|warn|error"),
    ("auth.account", "Keyring account holding the token, or 'none'"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
        /// Local directory tracked paths are relative to
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Top-level remote folder name
        #[arg(long)]
        backup_folder: Option<String>,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "sync.backup_folder")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Init {
                force,
                base_dir,
                backup_folder,
            } => self.execute_init(ctx, *force, base_dir.clone(), backup_folder.clone()),
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_init(
        &self,
        ctx: &CliContext,
        force: bool,
        base_dir: Option<PathBuf>,
        backup_folder: Option<String>,
    ) -> Result<()> {
        let formatter = ctx.formatter();
        let path = &ctx.config_path;

        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists; pass --force to overwrite",
                path.display()
            );
        }

        let mut config = Config::default();
        if let Some(base_dir) = base_dir {
            config.sync.base_dir = base_dir;
        }
        if let Some(name) = backup_folder {
            config.sync.backup_folder = name;
        }
        config.save(path)?;
        info!(config_path = %path.display(), "Wrote configuration");

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "config_path": path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Wrote {}", path.display()));
            formatter.info("Add paths with 'drivemirror track add <PATH>'");
        }
        Ok(())
    }

    fn execute_set(&self, ctx: &CliContext, key: &str, value: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config()?;

        info!(key = %key, value = %value, "Setting configuration value");

        if let Err(e) = apply_config_value(&mut config, key, value) {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "error": e.to_string(),
                }));
            } else {
                formatter.error(&format!("Failed to set '{key}': {e}"));
                formatter.info("");
                formatter.info("Supported keys:");
                for (name, description) in SUPPORTED_KEYS {
                    formatter.info(&format!("  {name:<28} - {description}"));
                }
            }
            return Ok(());
        }

        // Only reject errors caused by this key; the base directory may not exist yet
        let errors: Vec<String> = config
            .validate()
            .iter()
            .filter(|e| e.field == key && e.field != "sync.base_dir")
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        if !errors.is_empty() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "success": false,
                    "key": key,
                    "value": value,
                    "errors": errors,
                }));
            } else {
                formatter.error(&format!("Invalid value for '{key}': {}", errors.join("; ")));
            }
            return Ok(());
        }

        config.save(&ctx.config_path)?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": ctx.config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {key} = {value}"));
            formatter.info(&format!("Saved to {}", ctx.config_path.display()));
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let path = &ctx.config_path;

        if !path.exists() {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!({
                    "valid": false,
                    "config_path": path.display().to_string(),
                    "errors": ["Configuration file not found. Using defaults."],
                }));
            } else {
                formatter.info(&format!("Configuration file not found at {}", path.display()));
                formatter.info("Run 'drivemirror config init' to create one.");
            }
            return Ok(());
        }

        let config = match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {e:#}")],
                    }));
                } else {
                    formatter.error(&format!("Failed to parse configuration: {e:#}"));
                    formatter.info(&format!("File: {}", path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %path.display(), "Validating configuration");
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(ToString::to_string).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

/// Apply a dot-notation key/value pair to a Config struct
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- sync ---
        "sync.base_dir" => {
            config.sync.base_dir = PathBuf::from(value);
        }
        "sync.backup_folder" => {
            config.sync.backup_folder = value.to_string();
        }

        // --- drive ---
        "drive.api_base_url" => {
            config.drive.api_base_url = value.to_string();
        }
        "drive.upload_base_url" => {
            config.drive.upload_base_url = value.to_string();
        }
        "drive.page_size" => {
            config.drive.page_size = value
                .parse::<u32>()
                .context("Expected a positive integer for drive.page_size")?;
        }
        "drive.request_timeout_secs" => {
            config.drive.request_timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for drive.request_timeout_secs")?;
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }

        // --- auth ---
        "auth.account" => {
            config.auth.account = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            };
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}
