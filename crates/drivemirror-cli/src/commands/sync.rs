//! Sync command - Mirror tracked paths to Google Drive
//!
//! Provides the `drivemirror sync` CLI command which:
//! 1. Loads and validates the configuration
//! 2. Wires the Drive adapter into a `SyncEngine`
//! 3. Plans the actions and sums the bytes to upload
//! 4. Applies the actions, printing per-file progress
//!
//! Ctrl-C stops the run before the next action starts; an action already
//! in flight completes first.

use std::time::Instant;

use anyhow::Result;
use clap::Args;
use drivemirror_sync::{SyncError, SyncReport, TransferProgress};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{build_engine, human_bytes, CliContext, PlanScope};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Paths to mirror instead of the configured tracked paths
    pub paths: Vec<String>,
}

impl SyncCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_valid_config()?;
        let scope = PlanScope::new(&config, &self.paths)?;

        if scope.tracked.is_empty() {
            formatter.warn("No tracked paths. Add one with 'drivemirror track add <PATH>'.");
            return Ok(());
        }

        let engine = build_engine(&config)?;
        let started = Instant::now();

        formatter.info("Planning...");
        let actions = engine
            .plan_selected(&scope.tracked, &scope.selected)
            .await?;
        let total = engine.total_upload_bytes(&actions).await?;
        formatter.info(&format!(
            "{} action(s), {} to upload",
            actions.len(),
            human_bytes(total)
        ));

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current action");
                ctrl_c.cancel();
            }
        });

        let mut progress = TransferProgress::new(total);
        let result = engine
            .apply_actions_with_cancel(&actions, &cancel, |update| {
                progress.record(update.bytes);
                formatter.progress(&progress, &update.path.to_string());
            })
            .await;
        signal_task.abort();

        let summary = match result {
            Ok(summary) => summary,
            Err(SyncError::Cancelled) => {
                anyhow::bail!("Synchronization cancelled; run 'drivemirror sync' to resume")
            }
            Err(e) => return Err(e.into()),
        };
        let report = SyncReport::from_summary(actions.len(), summary, started);

        info!(
            uploaded = report.uploaded,
            replaced = report.replaced,
            deleted = report.deleted,
            "Sync finished"
        );

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "report": report,
            }));
            return Ok(());
        }

        formatter.success(&format!(
            "Synchronized: {} uploaded, {} replaced, {} deleted",
            report.uploaded, report.replaced, report.deleted
        ));
        if report.already_gone > 0 {
            formatter.info(&format!("{} entries were already gone", report.already_gone));
        }
        formatter.info(&format!(
            "{} in {:.1}s",
            human_bytes(report.bytes_uploaded),
            report.duration_ms as f64 / 1000.0
        ));
        Ok(())
    }
}
