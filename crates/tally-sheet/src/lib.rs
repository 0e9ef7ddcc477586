//! # tally-sheet: Spreadsheet Persistence for Tally
//!
//! Loads and saves an [`Inventory`] as a single-sheet `.xlsx` workbook.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Data Flow                                  │
//! │                                                                         │
//! │  apps/cli (startup / "save and exit")                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tally-sheet (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐                        │   │
//! │  │   │  SheetStore   │    │     xlsx      │                        │   │
//! │  │   │  (store.rs)   │───►│  (xlsx.rs)    │                        │   │
//! │  │   │ load / save   │    │ read / write  │                        │   │
//! │  │   └───────┬───────┘    └───────────────┘                        │   │
//! │  │           │ grid of cells                                       │   │
//! │  │           ▼                                                     │   │
//! │  │   tally_core::codec (encode / decode)                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 inventory_data.xlsx                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Configuration and the load/save entry points
//! - [`xlsx`] - Workbook ⇄ cell grid conversion
//! - [`error`] - Persistence error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tally_sheet::{SheetConfig, SheetStore};
//!
//! let store = SheetStore::new(SheetConfig::new("inventory_data.xlsx"));
//! let mut inventory = store.load()?.inventory;
//! // ... mutate ...
//! store.save(&inventory)?;
//! # Ok::<(), tally_sheet::SheetError>(())
//! ```
//!
//! [`Inventory`]: tally_core::Inventory

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod store;
pub mod xlsx;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{SheetError, SheetResult};
pub use store::{SheetConfig, SheetStore, DEFAULT_PATH, DEFAULT_SHEET_NAME};

use std::path::PathBuf;

use tally_core::{Decoded, Inventory};

/// Loads the inventory stored at `path` with default settings.
pub fn load(path: impl Into<PathBuf>) -> SheetResult<Decoded> {
    SheetStore::new(SheetConfig::new(path)).load()
}

/// Saves `inventory` to `path` with default settings.
pub fn save(inventory: &Inventory, path: impl Into<PathBuf>) -> SheetResult<()> {
    SheetStore::new(SheetConfig::new(path)).save(inventory)
}
