//! Terminal output for the CLI
//!
//! Human mode prints marked lines meant for a person watching a sync. JSON
//! mode keeps stdout for the single result document of a command and sends
//! per-file progress to stderr as one JSON object per line.

use drivemirror_core::domain::SyncStatus;
use drivemirror_sync::TransferProgress;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub trait OutputFormatter: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    /// One finished upload, replacement or deletion during `sync`
    fn progress(&self, progress: &TransferProgress, path: &str);
    /// Status of one path, reported while `status` walks the tracked paths
    fn status(&self, path: &str, status: &SyncStatus);
    fn print_json(&self, value: &serde_json::Value);
}

/// `[  3.20/10.00 MB  32%] Docs/a.txt`
fn progress_line(progress: &TransferProgress, path: &str) -> String {
    format!("[{}] {}", progress.summary(), path)
}

/// Status name padded so paths line up in a column
fn status_line(path: &str, status: &SyncStatus) -> String {
    format!("{:<14} {}", status.to_string(), path)
}

fn progress_event(progress: &TransferProgress, path: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "progress",
        "path": path,
        "transferred_bytes": progress.transferred_bytes(),
        "total_bytes": progress.total_bytes(),
    })
}

pub struct HumanFormatter {
    /// Suppress `info`, progress and status lines
    pub quiet: bool,
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
    fn progress(&self, progress: &TransferProgress, path: &str) {
        self.info(&progress_line(progress, path));
    }
    fn status(&self, path: &str, status: &SyncStatus) {
        self.info(&status_line(path, status));
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn progress(&self, progress: &TransferProgress, path: &str) {
        eprintln!("{}", progress_event(progress, path));
    }
    // Statuses are part of the final document
    fn status(&self, _path: &str, _status: &SyncStatus) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter { quiet }),
    }
}
