//! Status command - Display synchronization status
//!
//! Provides the `drivemirror status` CLI command which reports one status
//! per tracked path. Directories report the combined status of every file
//! below them. No remote folders are created.

use anyhow::Result;
use clap::Args;
use drivemirror_core::domain::SyncStatus;
use tracing::info;

use super::{build_engine, select_paths, CliContext};

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Paths to check instead of the configured tracked paths
    pub paths: Vec<String>,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_valid_config()?;
        let tracked = select_paths(&config, &self.paths)?;

        if tracked.is_empty() {
            formatter.warn("No tracked paths. Add one with 'drivemirror track add <PATH>'.");
            return Ok(());
        }

        let engine = build_engine(&config)?;
        let statuses = engine
            .check_status(&tracked, |path, status| {
                formatter.status(&path.to_string(), &status)
            })
            .await?;

        info!(paths = statuses.len(), "Status checked");

        if ctx.is_json() {
            let entries: Vec<serde_json::Value> = tracked
                .iter()
                .filter_map(|path| statuses.get(path).map(|s| (path, s)))
                .map(|(path, status)| {
                    serde_json::json!({"path": path.to_string(), "status": status})
                })
                .collect();
            formatter.print_json(&serde_json::json!({ "paths": entries }));
            return Ok(());
        }

        let pending = statuses
            .values()
            .filter(|s| !matches!(s, SyncStatus::Synced))
            .count();
        if pending == 0 {
            formatter.success("All tracked paths are synced");
        } else {
            formatter.warn(&format!(
                "{pending} of {} tracked path(s) not synced",
                statuses.len()
            ));
        }
        Ok(())
    }
}
