//! Track command - Manage the paths DriveMirror mirrors
//!
//! Edits `sync.tracked_paths` in the configuration file. Paths are relative
//! to `sync.base_dir` and stored in normalized form.

use anyhow::{Context, Result};
use clap::Subcommand;
use drivemirror_core::config::Config;
use drivemirror_core::domain::RelativePath;
use tracing::info;

use super::CliContext;

#[derive(Debug, Subcommand)]
pub enum TrackCommand {
    /// Start mirroring a file or directory
    Add {
        /// Path relative to the base directory
        path: String,
    },
    /// Stop mirroring a path; the next sync removes it remotely
    Remove {
        /// Path relative to the base directory
        path: String,
    },
    /// List tracked paths
    List,
}

impl TrackCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            TrackCommand::Add { path } => self.execute_add(ctx, path),
            TrackCommand::Remove { path } => self.execute_remove(ctx, path),
            TrackCommand::List => self.execute_list(ctx),
        }
    }

    fn execute_add(&self, ctx: &CliContext, path: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config()?;

        let relative = RelativePath::new(path).with_context(|| format!("Invalid path '{path}'"))?;
        let local = relative.to_local(&config.base_dir());
        if !local.exists() {
            anyhow::bail!("{} does not exist", local.display());
        }

        let added = add_tracked(&mut config, &relative);
        if added {
            config.save(&ctx.config_path)?;
            info!(path = %relative, "Tracked path added");
        }

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "path": relative.to_string(),
                "added": added,
            }));
        } else if added {
            formatter.success(&format!("Tracking {relative}"));
        } else {
            formatter.info(&format!("{relative} is already tracked"));
        }
        Ok(())
    }

    fn execute_remove(&self, ctx: &CliContext, path: &str) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config()?;

        let relative = RelativePath::new(path).with_context(|| format!("Invalid path '{path}'"))?;
        let removed = remove_tracked(&mut config, &relative);
        if removed {
            config.save(&ctx.config_path)?;
            info!(path = %relative, "Tracked path removed");
        }

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": removed,
                "path": relative.to_string(),
            }));
        } else if removed {
            formatter.success(&format!("No longer tracking {relative}"));
        } else {
            formatter.error(&format!("{relative} is not tracked"));
        }
        Ok(())
    }

    fn execute_list(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "base_dir": config.base_dir().display().to_string(),
                "tracked_paths": config.sync.tracked_paths,
            }));
            return Ok(());
        }

        if config.sync.tracked_paths.is_empty() {
            formatter.info("No tracked paths");
            return Ok(());
        }
        formatter.success(&format!("Tracked under {}", config.base_dir().display()));
        for path in &config.sync.tracked_paths {
            formatter.info(path);
        }
        Ok(())
    }
}

/// Add `path` unless an equivalent entry exists; returns whether it was added
fn add_tracked(config: &mut Config, path: &RelativePath) -> bool {
    if position(config, path).is_some() {
        return false;
    }
    config.sync.tracked_paths.push(path.to_string());
    true
}

/// Remove the entry equivalent to `path`; returns whether one was found
fn remove_tracked(config: &mut Config, path: &RelativePath) -> bool {
    match position(config, path) {
        Some(index) => {
            config.sync.tracked_paths.remove(index);
            true
        }
        None => false,
    }
}

fn position(config: &Config, path: &RelativePath) -> Option<usize> {
    config
        .sync
        .tracked_paths
        .iter()
        .position(|p| RelativePath::new(p.as_str()).is_ok_and(|existing| &existing == path))
}
