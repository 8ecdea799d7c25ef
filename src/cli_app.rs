//! Top-level CLI definition and dispatch.
//!
//! The binary wires the dashboard engine to the built-in synthetic feed;
//! embedders attach a real capture/analysis pipeline through the library
//! seams instead.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossbeam_channel::unbounded;
use tracing_subscriber::EnvFilter;

use snifftop::core::config::DashboardConfig;
use snifftop::core::errors::{Result, SniffError};
use snifftop::source::sim::SimulatedSource;
use snifftop::tui::backend::CrosstermBackend;
use snifftop::tui::runtime::run_dashboard;

/// Live terminal dashboard for streaming traffic-analysis statistics.
#[derive(Debug, Parser)]
#[command(
    name = "snifftop",
    author,
    version,
    about = "Live terminal dashboard for streaming traffic-analysis statistics",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Refresh interval in milliseconds.
    #[arg(long, value_name = "MS")]
    refresh_ms: Option<u64>,
    /// Report totals since startup instead of per-interval deltas.
    #[arg(long)]
    cumulative: bool,
    /// Write tracing diagnostics to this file (the terminal itself stays
    /// reserved for the dashboard).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Seed for the synthetic demo feed.
    #[arg(long, default_value_t = 0, value_name = "N")]
    seed: u64,
}

/// Merge config sources, set up diagnostics, and run the dashboard until
/// the user quits.
pub fn run(args: &Cli) -> Result<()> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(ms) = args.refresh_ms {
        config.refresh_ms = ms;
    }
    if args.cumulative {
        config.cumulative = true;
    }
    if let Some(path) = &args.log_file {
        config.log_file = Some(path.clone());
    }
    config.validate()?;
    init_tracing(config.log_file.as_deref())?;

    let mut source = SimulatedSource::new(args.seed);
    let stats = source.stats_handle();

    let (messages_tx, messages_rx) = unbounded();
    let _ = messages_tx.send("Synthetic feed attached (no capture stack)".to_string());
    let _ = messages_tx.send("Press p to pause, q to quit, Ctrl-L to repaint".to_string());

    let mut backend = CrosstermBackend::new();
    run_dashboard(&mut backend, &mut source, &stats, &config, messages_rx)
}

fn init_tracing(log_file: Option<&std::path::Path>) -> Result<()> {
    let Some(path) = log_file else {
        // No sink configured: diagnostics are dropped rather than scribbled
        // over the dashboard's terminal.
        return Ok(());
    };
    let file = File::create(path).map_err(|e| SniffError::io(path, e))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
