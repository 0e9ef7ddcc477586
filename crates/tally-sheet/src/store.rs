//! # Sheet Store
//!
//! Load and save entry points for the inventory data file.
//!
//! ## Save Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save(&inventory)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  codec::encode ──► grid                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write_grid ──► inventory_data.xlsx.tmp   (same directory)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rename .tmp ──► inventory_data.xlsx      (replaces the old file)       │
//! │                                                                         │
//! │  A failed write leaves the previous file untouched.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tally_core::{codec, Decoded, Inventory};
use tracing::{debug, info, warn};

use crate::error::{SheetError, SheetResult};
use crate::xlsx;

/// Data file used when none is configured.
pub const DEFAULT_PATH: &str = "inventory_data.xlsx";

/// Worksheet name written on save.
pub const DEFAULT_SHEET_NAME: &str = "Sheet";

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust
/// use tally_sheet::SheetConfig;
///
/// let config = SheetConfig::new("shop.xlsx").sheet_name("Inventory");
/// assert_eq!(config.sheet_name, "Inventory");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    /// Path to the workbook. Created on first save.
    pub path: PathBuf,

    /// Name of the worksheet written on save.
    /// Default: "Sheet". Loading always reads the first worksheet.
    pub sheet_name: String,
}

impl SheetConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SheetConfig {
            path: path.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    /// Sets the worksheet name.
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig::new(DEFAULT_PATH)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Reads and writes one inventory data file.
#[derive(Debug, Clone)]
pub struct SheetStore {
    config: SheetConfig,
}

impl SheetStore {
    pub fn new(config: SheetConfig) -> Self {
        SheetStore { config }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Loads the inventory.
    ///
    /// ## Behavior
    /// - Missing file: empty inventory, no warnings
    /// - Otherwise: first worksheet, decoded by `tally_core::codec`
    ///
    /// Cells that had to be defaulted are logged and returned in
    /// [`Decoded::warnings`].
    pub fn load(&self) -> SheetResult<Decoded> {
        let path = self.path();

        let exists = path.try_exists().map_err(|e| SheetError::io(path, e))?;
        if !exists {
            info!(path = %path.display(), "No data file, starting with an empty inventory");
            return Ok(Decoded::default());
        }

        let grid = xlsx::read_grid(path)?;
        let decoded = codec::decode(&grid)?;

        for warning in &decoded.warnings {
            warn!(path = %path.display(), "{}", warning);
        }
        info!(
            path = %path.display(),
            products = decoded.inventory.products.len(),
            sales = decoded.inventory.sales.len(),
            "Loaded inventory"
        );

        Ok(decoded)
    }

    /// Saves the inventory, replacing the whole file.
    pub fn save(&self, inventory: &Inventory) -> SheetResult<()> {
        let path = self.path();
        let tmp = temp_path(path);
        let grid = codec::encode(inventory);

        if let Err(err) = xlsx::write_grid(&tmp, &self.config.sheet_name, &grid) {
            discard(&tmp);
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp, path) {
            discard(&tmp);
            return Err(SheetError::io(path, err));
        }

        info!(
            path = %path.display(),
            products = inventory.products.len(),
            sales = inventory.sales.len(),
            "Saved inventory"
        );
        Ok(())
    }
}

/// `dir/name.xlsx` → `dir/name.xlsx.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from(DEFAULT_PATH));
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard(tmp: &Path) {
    if let Err(err) = fs::remove_file(tmp) {
        debug!(path = %tmp.display(), error = %err, "Temporary file not removed");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
