//! # Shared Inventory
//!
//! A cloneable, thread-safe handle to one [`Inventory`].
//!
//! ## Thread Safety
//! The inventory is wrapped in `Arc<Mutex<T>>`:
//! 1. `Arc`: every clone of the handle points at the same inventory
//! 2. `Mutex`: one caller at a time, for the whole closure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  thread 1: sell(A × 3) ──► lock ──► validate ──► commit ──► unlock     │
//! │  thread 2: sell(A × 3) ─────────────── waits ──────────────► lock ...  │
//! │                                                                         │
//! │  The stock check and the decrement never interleave with another sale. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::CoreResult;
use crate::money::Percent;
use crate::types::{Inventory, Sale, SaleLine};

#[derive(Debug, Clone, Default)]
pub struct SharedInventory {
    inner: Arc<Mutex<Inventory>>,
}

impl SharedInventory {
    pub fn new(inventory: Inventory) -> Self {
        SharedInventory {
            inner: Arc::new(Mutex::new(inventory)),
        }
    }

    // Inventory methods never leave the aggregate half-updated, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with exclusive access to the inventory.
    ///
    /// ## Usage
    /// ```rust
    /// use tally_core::{Inventory, Money, Product, SharedInventory};
    ///
    /// let shared = SharedInventory::new(Inventory::new());
    /// shared.with(|inv| {
    ///     inv.add_product(Product::new("A", "Apple", Money::from_cents(100), 1));
    /// });
    /// assert_eq!(shared.with(|inv| inv.products().len()), 1);
    /// ```
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Inventory) -> R,
    {
        let mut inventory = self.lock();
        f(&mut inventory)
    }

    /// Runs [`Inventory::make_sale`] under the lock and returns a copy of the sale.
    pub fn sell(
        &self,
        lines: Vec<SaleLine>,
        payment_method: impl Into<String>,
        discount: Percent,
        tax_rate: Percent,
    ) -> CoreResult<Sale> {
        let mut inventory = self.lock();
        let sale = inventory
            .make_sale(lines, payment_method, discount, tax_rate)?
            .clone();
        Ok(sale)
    }

    /// Takes a copy of the current state (e.g. for saving).
    pub fn snapshot(&self) -> Inventory {
        self.lock().clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Money;
    use crate::types::Product;
    use std::thread;

    #[test]
    fn test_concurrent_sales_never_oversell() {
        let mut inventory = Inventory::new();
        inventory.add_product(Product::new("A", "Apple", Money::from_cents(100), 10));
        let shared = SharedInventory::new(inventory);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let line = SaleLine::new("A", "Apple", Money::from_cents(100), 3);
                    shared.sell(vec![line], "cash", Percent::zero(), Percent::zero())
                })
            })
            .collect();

        let results: Vec<CoreResult<Sale>> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        let sold = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::InsufficientStock { .. })))
            .count();

        // 10 units, 3 per sale: exactly three sales fit
        assert_eq!(sold, 3);
        assert_eq!(rejected, 5);

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.product("A").unwrap().quantity, 1);
        assert_eq!(snapshot.sales().len(), 3);
    }
}
