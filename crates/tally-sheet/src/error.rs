//! # Persistence Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  calamine / rust_xlsxwriter / std::io / CodecError                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SheetError (this module) ← Adds the file path where it helps           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow::Error in apps/cli ← Printed once, process exits                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tally_core::CodecError;
use thiserror::Error;

/// Spreadsheet persistence errors.
#[derive(Debug, Error)]
pub enum SheetError {
    /// File system error (permissions, disk full, missing directory).
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a readable xlsx workbook.
    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    /// The workbook could not be written.
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// The workbook contains no worksheet at all.
    #[error("Workbook {} has no worksheet", .0.display())]
    NoWorksheet(PathBuf),

    /// More rows or columns than a worksheet can address.
    #[error("Grid too large: {rows} rows")]
    GridTooLarge { rows: usize },

    /// The sheet does not follow the inventory layout.
    #[error("Invalid inventory sheet: {0}")]
    Codec(#[from] CodecError),
}

impl SheetError {
    /// Creates an Io error for a given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SheetError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for Results with SheetError.
pub type SheetResult<T> = Result<T, SheetError>;
