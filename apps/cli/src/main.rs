//! # Tally Entry Point
//!
//! See the `tally_cli` library for the startup sequence.

use std::io;

use anyhow::Context;
use clap::Parser;
use tally_cli::{Args, Shell};
use tally_sheet::SheetStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let store = SheetStore::new(args.sheet_config());
    let decoded = store
        .load()
        .with_context(|| format!("could not load {}", store.path().display()))?;
    info!(warnings = decoded.warnings.len(), "Starting shell");

    let mut shell = Shell::new(decoded.inventory, store, io::stdin().lock(), io::stdout().lock());
    shell.run().context("shell stopped")?;
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `--log-level debug` or `TALLY_LOG=debug` - every lookup and decode
/// - `TALLY_LOG=tally_sheet=info` - file activity only
/// - Default: `warn` (defaulted cells in the data file)
fn init_tracing(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
