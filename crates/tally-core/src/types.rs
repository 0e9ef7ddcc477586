//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                    ┌─────────────────────────┐                          │
//! │                    │       Inventory         │  aggregate root,         │
//! │                    │  products: Vec<Product> │  one per data file       │
//! │                    │  sales:    Vec<Sale>    │                          │
//! │                    └───────┬─────────┬───────┘                          │
//! │                            │         │                                  │
//! │  ┌─────────────────┐       │         │       ┌─────────────────┐        │
//! │  │    Product      │◄──────┘         └──────►│      Sale       │        │
//! │  │  code (business)│                         │  lines          │        │
//! │  │  name           │    snapshot copy        │  total_amount   │        │
//! │  │  price: Money   │ ──────────────────────► │  discount, tax  │        │
//! │  │  quantity: u32  │      SaleLine           │  date           │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::money::{Money, Percent};

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Codes are expected to be unique but nothing enforces it; lookups act on
/// the first match in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Business identifier, matched exactly and case-sensitively.
    pub code: String,

    /// Display label.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Units currently in stock.
    pub quantity: u32,
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        Product {
            code: code.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: u64) -> bool {
        u64::from(self.quantity) >= quantity
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: code, name and price are copied when the line
/// is built, so later catalog edits never rewrite sales history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub code: String,
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub price: Money,
    /// Quantity sold in this transaction.
    pub quantity: u32,
}

impl SaleLine {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        SaleLine {
            code: code.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Freezes a catalog product into a line item for `quantity` units.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        SaleLine {
            code: product.code.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    /// Line total before tax and discount (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub lines: Vec<SaleLine>,

    /// Subtotal with tax applied first, then the discount.
    pub total_amount: Money,

    /// Free-form payment method ("cash", "card", ...).
    pub payment_method: String,

    pub discount: Percent,

    pub tax_rate: Percent,

    /// When the sale was made, at whole-second resolution.
    pub date: NaiveDateTime,
}

impl Sale {
    /// Computes a sale total: Σ(price × quantity), plus tax, minus discount.
    ///
    /// ## Order Matters
    /// ```text
    /// subtotal ──► + tax_rate ──► − discount ──► total
    /// ```
    /// Rounding happens at each step, so swapping the two steps can move the
    /// total by a cent.
    ///
    /// Returns `None` when any step leaves the i64 cent range.
    pub fn compute_total(lines: &[SaleLine], discount: Percent, tax_rate: Percent) -> Option<Money> {
        let subtotal = lines.iter().try_fold(Money::zero(), |sum, line| {
            sum.checked_add(line.price.checked_multiply_quantity(line.quantity)?)
        })?;
        subtotal.checked_apply_tax(tax_rate)?.checked_apply_discount(discount)
    }

    /// Checks if any line item carries `code`.
    pub fn contains_code(&self, code: &str) -> bool {
        self.lines.iter().any(|line| line.code == code)
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// The aggregate root: the catalog plus the sales history.
///
/// One `Inventory` maps to exactly one data file. Products keep insertion
/// order; sales are append-only and chronological by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
}

impl Inventory {
    /// Creates an empty inventory (no products, no sales).
    pub fn new() -> Self {
        Inventory::default()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.sales.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_line_snapshot_is_independent() {
        let mut product = Product::new("A", "Apple", Money::from_cents(120), 10);
        let line = SaleLine::from_product(&product, 4);

        product.name = "Green Apple".to_string();
        product.price = Money::from_cents(999);

        assert_eq!(line.name, "Apple");
        assert_eq!(line.price.cents(), 120);
        assert_eq!(line.line_total().cents(), 480);
    }

    #[test]
    fn test_compute_total() {
        let lines = vec![
            SaleLine::new("A", "Apple", Money::from_cents(1000), 2),
            SaleLine::new("B", "Bread", Money::from_cents(250), 4),
        ];
        // 30.00 + 10 % = 33.00, - 50 % = 16.50
        let total = Sale::compute_total(&lines, Percent::from_bps(5000), Percent::from_bps(1000));
        assert_eq!(total.unwrap().cents(), 1650);
    }

    #[test]
    fn test_compute_total_out_of_range() {
        let price = Money::from_cents(i64::MAX / 4);
        let lines = vec![SaleLine::new("A", "Apple", price, 2), SaleLine::new("B", "Bread", price, 2)];
        let none = Percent::zero();

        assert!(Sale::compute_total(&lines[..1], none, none).is_some());
        assert_eq!(Sale::compute_total(&lines, none, none), None);
        assert_eq!(Sale::compute_total(&lines[..1], none, Percent::from_bps(10_000)), None);
    }

    #[test]
    fn test_can_sell() {
        let product = Product::new("A", "Apple", Money::from_cents(100), 3);
        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
        assert!(product.can_sell(0));
    }

    #[test]
    fn test_new_inventory_is_empty() {
        let inventory = Inventory::new();
        assert!(inventory.products.is_empty());
        assert!(inventory.sales.is_empty());
        assert!(inventory.is_empty());
    }
}
