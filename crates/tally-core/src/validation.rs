//! # Validation Module
//!
//! Input rules applied by the shell before values reach [`Inventory`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Prompt (apps/cli)                                             │
//! │  ├── Parse failures (not a number, bad date)                            │
//! │  └── Re-ask until the input parses                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Required fields, length limits, positive quantities                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inventory operations                                          │
//! │  └── Stock checks, unknown codes                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data loaded from a file skips layers 1 and 2: files are trusted as written.
//!
//! [`Inventory`]: crate::types::Inventory

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product code, in characters.
pub const MAX_CODE_LEN: usize = 50;

/// Longest accepted product name, in characters.
pub const MAX_NAME_LEN: usize = 200;

const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_code;
///
/// assert_eq!(validate_code("  A-1 ").unwrap(), "A-1");
/// assert!(validate_code("").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<String> {
    required_bounded("code", code, MAX_CODE_LEN)
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_bounded("name", name, MAX_NAME_LEN)
}

/// Validates a search keyword. Empty is allowed and matches everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

fn required_bounded(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity requested in a sale.
///
/// Stock levels may be zero; a sale line may not.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::invalid_format("price", "must not be negative"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert_eq!(validate_code("COKE-330").unwrap(), "COKE-330");
        assert_eq!(validate_code("  A  ").unwrap(), "A");
        assert!(matches!(
            validate_code("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_code(&"A".repeat(51)),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("Cake, large").unwrap(), "Cake, large");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"é".repeat(200)).is_ok());
        assert!(validate_product_name(&"é".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  app ").unwrap(), "app");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1999)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }
}
