mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod query;
mod sync;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "txreview")]
#[command(about = "Review and approve transactions from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/txreview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the transaction service (overrides the config file)
  #[arg(short, long)]
  url: Option<String>,

  /// Undo an approval toggle when the server rejects it
  #[arg(long)]
  revert_on_failure: bool,
}

/// Initialize the tracing subscriber, logging to a file so output on
/// stdout stays readable.
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let appender = tracing_appender::rolling::never(log_dir, "txreview.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(filter)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref(), args.url)?;

  // Override policy if specified on command line
  if args.revert_on_failure {
    config.approvals.on_confirm_failure = sync::ConfirmFailurePolicy::Revert;
  }

  let _log_guard = init_tracing(&config.log_dir())?;
  info!(url = %config.api.url, policy = ?config.approvals.on_confirm_failure, "txreview starting");

  // Initialize and run the app
  let mut app = app::App::new(&config)?;
  app.run().await?;

  Ok(())
}
