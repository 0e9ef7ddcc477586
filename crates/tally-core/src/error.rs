//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors                                                     │
//! │  ├── CoreError        - Catalog and sale rule violations (this file)   │
//! │  ├── ValidationError  - Shell input validation (this file)             │
//! │  └── CodecError       - Grid could not be decoded (codec.rs)           │
//! │                                                                         │
//! │  tally-sheet errors (separate crate)                                   │
//! │  └── SheetError       - File read/write failures                       │
//! │                                                                         │
//! │  Flow: CoreError ──► shell prints message, process continues           │
//! │        SheetError ──► propagated to main, process may terminate        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Catalog and sale errors.
///
/// None of these is fatal: the operation that produced one left the
/// inventory exactly as it found it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No catalog product has the given code.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A sale asked for more units than the catalog holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell A × 3, A × 3
    ///      │
    ///      ▼
    /// Check stock: available=5, requested=6 (summed per code)
    ///      │
    ///      ▼
    /// InsufficientStock { code: "A", available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// Sale aborted, catalog untouched
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: u32,
        requested: u64,
    },

    /// A sale was requested with no line items.
    #[error("A sale needs at least one line item")]
    EmptySale,

    /// The sale total does not fit in the money range.
    #[error("Sale total is too large")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the shell boundary before a value reaches the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., not a number, not a date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
