//! # Configuration
//!
//! Command line flags with environment overrides.
//!
//! ## Sources (Priority Order)
//! 1. Flags (`--file`, `--sheet`, `--log-level`)
//! 2. Environment variables (`TALLY_*`)
//! 3. Defaults (this file)

use std::path::PathBuf;

use clap::Parser;
use tally_sheet::{SheetConfig, DEFAULT_PATH, DEFAULT_SHEET_NAME};

/// Inventory and point-of-sale tracker.
#[derive(Debug, Clone, Parser)]
#[command(name = "tally", version)]
pub struct Args {
    /// Workbook holding the catalog and the sales history
    #[arg(short, long, env = "TALLY_DATA_FILE", default_value = DEFAULT_PATH)]
    pub file: PathBuf,

    /// Worksheet name used when saving
    #[arg(long, env = "TALLY_SHEET", default_value = DEFAULT_SHEET_NAME)]
    pub sheet: String,

    /// Log filter for stderr, e.g. "info" or "tally_core=debug"
    #[arg(long, env = "TALLY_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Args {
    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig::new(self.file.clone()).sheet_name(self.sheet.clone())
    }
}
