//! # Shell Error Type
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Shell                              │
//! │                                                                         │
//! │  CoreError (not found, stock) ──► printed, back to the menu             │
//! │  Malformed input, bad UTF-8   ──► printed, same prompt again            │
//! │                                                                         │
//! │  ShellError::EndOfInput       ──► leave the loop, save, exit 0          │
//! │  ShellError::Io / Sheet       ──► save, main.rs, anyhow, exit 1         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_sheet::SheetError;
use thiserror::Error;

/// Errors that stop the menu loop.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Standard input was closed.
    #[error("end of input")]
    EndOfInput,

    /// Reading the terminal or writing to it failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Saving the data file failed.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type ShellResult<T> = Result<T, ShellError>;
