//! DriveMirror CLI - Command-line interface for DriveMirror
//!
//! Provides commands for:
//! - Planning and running one-way mirror synchronization
//! - Checking the sync status of tracked paths
//! - Managing tracked paths and configuration
//! - Storing the access token in the system keyring

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use drivemirror_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand, plan::PlanCommand,
    status::StatusCommand, sync::SyncCommand, track::TrackCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "drivemirror",
    version,
    about = "One-way mirror of local folders into Google Drive"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the actions a sync would perform
    Plan(PlanCommand),
    /// Mirror tracked paths to the remote backup folder
    Sync(SyncCommand),
    /// Show the sync status of tracked paths
    Status(StatusCommand),
    /// Manage tracked paths
    #[command(subcommand)]
    Track(TrackCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Manage the stored access token
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Log filter from `-v`/`-q`, falling back to `logging.level`
fn log_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    match (quiet, verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => configured.to_string(),
        (false, 1) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let configured_level = Config::load_or_default(&config_path).logging.level;

    // Setup tracing; RUST_LOG wins over flags and config
    let filter = log_filter(cli.verbose, cli.quiet, &configured_level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext {
        format,
        quiet: cli.quiet,
        config_path,
    };

    match &cli.command {
        Commands::Plan(cmd) => cmd.execute(&ctx).await,
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Track(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
