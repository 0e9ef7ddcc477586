//! # tally-core: Pure Business Logic for Tally
//!
//! This crate is the **heart** of Tally. It holds the catalog, the sales
//! history and every rule that touches them, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (text menu)                         │   │
//! │  │    add / remove / edit / search / display / sell / report       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ inventory │  │   codec   │  │   │
//! │  │   │  Product  │  │   Money   │  │ make_sale │  │ Inventory │  │   │
//! │  │   │   Sale    │  │  Percent  │  │  report   │  │  ⇄ grid   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO STDIN • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-sheet (xlsx persistence)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, SaleLine, Sale, Inventory)
//! - [`money`] - Money and Percent with integer arithmetic
//! - [`inventory`] - Catalog CRUD and sale execution
//! - [`report`] - Sales report filtering
//! - [`shared`] - Mutex-guarded inventory handle
//! - [`codec`] - Two-section spreadsheet layout
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules for the shell boundary
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Inventory, Money, Percent, Product, SaleLine};
//!
//! let mut inventory = Inventory::new();
//! inventory.add_product(Product::new("A", "Apple", Money::from_cents(1000), 5));
//!
//! let line = SaleLine::from_product(inventory.product("A").unwrap(), 2);
//! let sale = inventory
//!     .make_sale(vec![line], "cash", Percent::zero(), Percent::from_bps(1000))
//!     .unwrap();
//!
//! assert_eq!(sale.total_amount.cents(), 2200);
//! assert_eq!(inventory.product("A").unwrap().quantity, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod error;
pub mod inventory;
pub mod money;
pub mod report;
pub mod shared;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use codec::{decode, encode, Cell, CodecError, CodecWarning, Decoded};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::ProductUpdate;
pub use money::{Money, Percent};
pub use report::{ReportFilter, SalesReport};
pub use shared::SharedInventory;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Timestamp pattern used for the persisted sale `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
