//! CLI entry point for the bearing catalog ingestion service.
//!
//! Supplier price lists dropped into the inbox are parsed, normalized and
//! merged into the canonical catalog.
//!
//! # Usage
//!
//! ```bash
//! brg-ingest [OPTIONS] [COMMAND]
//!
//! # Watch the inbox until Ctrl-C (default)
//! brg-ingest watch
//!
//! # Process whatever is in the inbox and exit
//! brg-ingest once --config-dir /etc/brg
//!
//! # Rebuild the catalog from the processed archive
//! brg-ingest rebuild
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Mutex;

use brg_core::{Config, LogFormat, LoggingConfig};
use brg_pipeline::{FileProcessor, StatsSnapshot};
use brg_watcher::{InboxFilter, InboxWatcher, StopHandle};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Ingests supplier bearing price lists into a canonical catalog.
#[derive(Parser)]
#[command(name = "brg-ingest", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute. Defaults to `watch`.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding `app.json`, `brand_aliases.json` and `parsing_rules.json`.
    #[arg(long, global = true, env = "BRG_CONFIG_DIR", default_value = "config")]
    config_dir: Utf8PathBuf,

    /// Override the log level from the configuration.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Watch the inbox and process files as they arrive.
    Watch {
        /// Leave files already in the inbox for the first poll instead of
        /// draining them at startup.
        #[arg(long)]
        no_existing: bool,
    },

    /// Process every file currently in the inbox, then exit.
    ///
    /// Exits with status 1 if any file ended in the error directory.
    Once,

    /// Rebuild the catalog from the processed archive.
    Rebuild,
}

/// Log level override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    /// Everything, including per-file gating decisions.
    Trace,
    /// Skips and parser details.
    Debug,
    /// One line per file.
    Info,
    /// Conflicts and degraded behavior.
    Warn,
    /// Failed files only.
    Error,
}

impl LogLevel {
    const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes console and file logging.
///
/// `RUST_LOG` wins if set, then `--log-level`, then `logging.level` from the
/// configuration. Both outputs use `logging.format`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
fn init_tracing(
    logging: &LoggingConfig,
    log_file: &Utf8Path,
    level: Option<LogLevel>,
    no_color: bool,
) -> color_eyre::Result<()> {
    let directive = level.map_or(logging.level.as_str(), |l| l.as_directive());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directive},notify=warn")));

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir).wrap_err_with(|| format!("creating log directory {dir}"))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .wrap_err_with(|| format!("opening log file {log_file}"))?;
    let file_writer = Mutex::new(file);

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_ansi(use_ansi))
            .with(fmt::layer().with_ansi(false).with_writer(file_writer))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(false))
            .with(fmt::layer().json().with_writer(file_writer))
            .try_init()?,
    }

    Ok(())
}

/// Stops `stop` on Ctrl-C or, on Unix, SIGTERM.
fn stop_on_signal(stop: StopHandle) {
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested, finishing current file");
        stop.stop();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Watches the inbox until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the processor cannot be set up or the watcher fails.
async fn run_watch(config: Config, no_existing: bool) -> color_eyre::Result<()> {
    let process_existing = config.watcher.process_on_start && !no_existing;
    let watcher_config = config.watcher.clone();
    let inbox = config.paths.inbox.clone();

    // Creates the inbox, so it must precede the watcher.
    let mut processor = FileProcessor::new(config)?;

    let filter = InboxFilter::new(&watcher_config.ignored_suffixes);
    let mut watcher = InboxWatcher::new(&inbox, &watcher_config, filter)?;
    stop_on_signal(watcher.stop_handle());

    watcher
        .start(process_existing, &mut |path: &Utf8Path| {
            processor.process_file(path);
        })
        .await?;

    let stats = processor.stats().snapshot();
    info!(
        processed = stats.processed,
        succeeded = stats.succeeded,
        duplicates = stats.duplicates,
        failed = stats.failed,
        "session finished"
    );
    Ok(())
}

/// Processes the inbox once.
///
/// # Errors
///
/// Returns an error if the processor cannot be set up or the inbox cannot
/// be listed.
fn run_once(config: Config) -> color_eyre::Result<ExitCode> {
    info!(inbox = %config.paths.inbox, "processing inbox once");

    let mut processor = FileProcessor::new(config)?;
    let summary = processor.process_inbox()?;
    print_summary(&summary);

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Rebuilds the catalog from archived files.
///
/// # Errors
///
/// Returns an error if the processor cannot be set up or the catalog cannot
/// be saved.
fn run_rebuild(config: Config) -> color_eyre::Result<()> {
    info!(processed = %config.paths.processed, "rebuilding catalog");

    let mut processor = FileProcessor::new(config)?;
    let summary = processor.rebuild_catalog()?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "Rebuilt catalog from {} files", summary.files);
    let _ = writeln!(handle, "  Records: {}", summary.records);
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints the totals of one inbox pass.
fn print_summary(stats: &StatsSnapshot) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle);
    let _ = writeln!(handle, "Inbox Summary");
    let _ = writeln!(handle, "=============");
    let _ = writeln!(handle, "Files processed:  {}", stats.processed);
    let _ = writeln!(handle, "  Succeeded:      {}", stats.succeeded);
    let _ = writeln!(handle, "  Duplicates:     {}", stats.duplicates);
    let _ = writeln!(handle, "  Failed:         {}", stats.failed);
    let _ = writeln!(handle, "Rows added:       {}", stats.rows_added);
    let _ = writeln!(handle, "Conflicts:        {}", stats.conflicts);
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Load configuration (logging settings come from it)
    let config = Config::load_dir(&cli.config_dir)
        .wrap_err_with(|| format!("loading configuration from {}", cli.config_dir))?;

    // 4. Initialize tracing
    init_tracing(
        &config.logging,
        &config.paths.log_file(),
        cli.log_level,
        cli.no_color,
    )?;

    // 5. Route to the command
    match cli.command.unwrap_or(Commands::Watch { no_existing: false }) {
        Commands::Watch { no_existing } => {
            run_watch(config, no_existing).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Once => run_once(config),
        Commands::Rebuild => {
            run_rebuild(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_watch() {
        let cli = Cli::try_parse_from(["brg-ingest"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "brg-ingest",
            "watch",
            "--no-existing",
            "--config-dir",
            "/etc/brg",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Watch { no_existing: true }));
        assert_eq!(cli.config_dir, "/etc/brg");
        assert_eq!(cli.log_level.map(LogLevel::as_directive), Some("debug"));
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(Cli::try_parse_from(["brg-ingest", "once", "--log-level", "loud"]).is_err());
    }
}
