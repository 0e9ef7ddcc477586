//! # Inventory Operations
//!
//! Catalog CRUD and sale execution on the [`Inventory`] aggregate.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       make_sale()                                       │
//! │                                                                         │
//! │  1. TOTAL                                                              │
//! │     └── Σ(price × qty) ──► + tax ──► − discount                        │
//! │                                                                         │
//! │  2. VALIDATE (read-only pre-pass)                                      │
//! │     └── every code exists?  summed qty ≤ stock?                        │
//! │     └── any failure ──► Err, nothing touched                           │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! │     └── decrement stock for every validated code                       │
//! │                                                                         │
//! │  4. RECORD                                                             │
//! │     └── append Sale { lines, total, payment, discount, tax, date }     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 2 and 3 run under one `&mut Inventory` borrow, so no other mutation
//! can interleave. [`SharedInventory`](crate::shared::SharedInventory) keeps
//! the same guarantee across threads.

use chrono::{Local, NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percent};
use crate::types::{Inventory, Product, Sale, SaleLine};

/// New values for [`Inventory::edit_product`]. The code is not editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl Inventory {
    // =========================================================================
    // Catalog
    // =========================================================================

    /// Products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Sales in chronological order.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Gets the first product with exactly this code.
    pub fn product(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.code == code)
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.products.iter().position(|p| p.code == code)
    }

    /// Appends a product to the catalog.
    ///
    /// There is no uniqueness check: adding a code twice keeps both rows.
    pub fn add_product(&mut self, product: Product) -> &Product {
        info!(code = %product.code, name = %product.name, "Adding product");
        self.products.push(product);
        &self.products[self.products.len() - 1]
    }

    /// Removes the first product with this code and returns it.
    ///
    /// ## Errors
    /// `ProductNotFound` if no product matches; the catalog is unchanged.
    pub fn remove_product(&mut self, code: &str) -> CoreResult<Product> {
        let idx = self
            .position(code)
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

        let removed = self.products.remove(idx);
        info!(code = %removed.code, "Removed product");
        Ok(removed)
    }

    /// Overwrites name, price and quantity of the first product with this code.
    pub fn edit_product(&mut self, code: &str, update: ProductUpdate) -> CoreResult<&Product> {
        let idx = self
            .position(code)
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;

        let product = &mut self.products[idx];
        product.name = update.name;
        product.price = update.price;
        product.quantity = update.quantity;

        info!(code = %product.code, quantity = product.quantity, "Edited product");
        Ok(&*product)
    }

    /// Finds products whose **name** contains `keyword`, ignoring case.
    ///
    /// Codes are not searched. An empty result is the "not found" case.
    pub fn search_products(&self, keyword: &str) -> Vec<&Product> {
        let needle = keyword.to_lowercase();
        let results: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();

        debug!(keyword = %keyword, hits = results.len(), "Searched products");
        results
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Sells `lines`, stamping the sale with the current local time.
    ///
    /// See [`Inventory::make_sale_at`].
    pub fn make_sale(
        &mut self,
        lines: Vec<SaleLine>,
        payment_method: impl Into<String>,
        discount: Percent,
        tax_rate: Percent,
    ) -> CoreResult<&Sale> {
        let now = Local::now().naive_local();
        self.make_sale_at(lines, payment_method, discount, tax_rate, now)
    }

    /// Sells `lines` at an explicit timestamp.
    ///
    /// ## Atomicity
    /// Requested quantities are summed per code and checked against stock
    /// before anything is decremented. If any code is missing or short, the
    /// inventory is returned untouched and no sale is recorded.
    ///
    /// ## Errors
    /// - `EmptySale` if `lines` is empty
    /// - `ProductNotFound` for the first code absent from the catalog
    /// - `InsufficientStock` for the first code whose stock is too low
    /// - `AmountOverflow` if the total leaves the money range
    pub fn make_sale_at(
        &mut self,
        lines: Vec<SaleLine>,
        payment_method: impl Into<String>,
        discount: Percent,
        tax_rate: Percent,
        date: NaiveDateTime,
    ) -> CoreResult<&Sale> {
        if lines.is_empty() {
            return Err(CoreError::EmptySale);
        }

        // Validate: nothing is mutated until every code has passed.
        let mut remaining: Vec<(usize, u32)> = Vec::new();
        for (code, requested) in requested_by_code(&lines) {
            let idx = self
                .position(code)
                .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))?;
            let product = &self.products[idx];

            if !product.can_sell(requested) {
                warn!(code = %code, available = product.quantity, requested, "Sale rejected");
                return Err(CoreError::InsufficientStock {
                    code: code.to_string(),
                    available: product.quantity,
                    requested,
                });
            }

            // requested <= quantity, so the difference fits in u32
            remaining.push((idx, (u64::from(product.quantity) - requested) as u32));
        }

        let total_amount = Sale::compute_total(&lines, discount, tax_rate).ok_or_else(|| {
            warn!(lines = lines.len(), "Sale rejected, total out of range");
            CoreError::AmountOverflow
        })?;

        // Commit
        for (idx, quantity) in remaining {
            self.products[idx].quantity = quantity;
        }

        let sale = Sale {
            lines,
            total_amount,
            payment_method: payment_method.into(),
            discount,
            tax_rate,
            date: date.with_nanosecond(0).unwrap_or(date),
        };

        info!(
            lines = sale.lines.len(),
            total = %sale.total_amount,
            payment_method = %sale.payment_method,
            "Sale recorded"
        );

        self.sales.push(sale);
        Ok(&self.sales[self.sales.len() - 1])
    }
}

/// Sums requested quantities per code, in order of first appearance.
fn requested_by_code(lines: &[SaleLine]) -> Vec<(&str, u64)> {
    let mut totals: Vec<(&str, u64)> = Vec::new();
    for line in lines {
        match totals.iter_mut().find(|(code, _)| *code == line.code) {
            Some((_, qty)) => *qty += u64::from(line.quantity),
            None => totals.push((line.code.as_str(), u64::from(line.quantity))),
        }
    }
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================
