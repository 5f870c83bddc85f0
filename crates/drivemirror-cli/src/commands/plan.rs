//! Plan command - Show what a sync would do
//!
//! Provides the `drivemirror plan` CLI command which lists the upload,
//! replace and delete actions needed to mirror the tracked paths, plus the
//! total upload size. Nothing is uploaded or deleted, but resolving
//! destination folders creates any that are missing on the remote side.

use anyhow::Result;
use clap::Args;
use drivemirror_core::domain::{SyncAction, SyncStatus};
use tracing::info;

use super::{action_target, build_engine, human_bytes, CliContext, PlanScope};

#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Paths to plan for instead of the configured tracked paths
    pub paths: Vec<String>,
}

impl PlanCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_valid_config()?;
        let scope = PlanScope::new(&config, &self.paths)?;

        if scope.tracked.is_empty() {
            formatter.warn("No tracked paths. Add one with 'drivemirror track add <PATH>'.");
            return Ok(());
        }

        let engine = build_engine(&config)?;
        let actions = engine
            .plan_selected(&scope.tracked, &scope.selected)
            .await?;
        let total = engine.total_upload_bytes(&actions).await?;

        info!(actions = actions.len(), total_bytes = total, "Plan computed");

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "actions": actions,
                "total_upload_bytes": total,
            }));
            return Ok(());
        }

        if actions.is_empty() {
            formatter.success("Everything is up to date");
            return Ok(());
        }

        formatter.success(&format!(
            "{} action{} planned, {} to upload",
            actions.len(),
            if actions.len() == 1 { "" } else { "s" },
            human_bytes(total)
        ));
        for line in describe(&actions) {
            formatter.info(&line);
        }
        Ok(())
    }
}

/// One line per action: verb and target
fn describe(actions: &[SyncAction]) -> Vec<String> {
    actions
        .iter()
        .map(|action| {
            let verb = match action.status() {
                SyncStatus::NotPresent => "upload",
                SyncStatus::OutOfSync => "replace",
                SyncStatus::ToBeDeleted => "delete",
                SyncStatus::ToBeDeletedFromRoot => "untrack",
                SyncStatus::Synced | SyncStatus::Unknown => "skip",
            };
            format!("{verb:<8} {}", action_target(action))
        })
        .collect()
}
