//! # Sales Report
//!
//! Filters the sales history by date range and product code.
//!
//! ```text
//! sales ──► start_date ≤ sale day? ──► sale day ≤ end_date? ──► has code? ──► report
//!              (skipped if None)          (skipped if None)      (skipped if None)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::Money;
use crate::types::{Inventory, Sale};

/// Report filters. `ReportFilter::default()` matches every sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// First calendar day included.
    pub start_date: Option<NaiveDate>,

    /// Last calendar day included.
    pub end_date: Option<NaiveDate>,

    /// Keep only sales with a line item for this code.
    pub product_code: Option<String>,
}

impl ReportFilter {
    /// Checks if a sale passes every filter that is set.
    pub fn matches(&self, sale: &Sale) -> bool {
        let day = sale.date.date();

        self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
            && self
                .product_code
                .as_deref()
                .map_or(true, |code| sale.contains_code(code))
    }
}

/// The matching sales, in history order, and their combined total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport<'a> {
    pub sales: Vec<&'a Sale>,
    pub total_revenue: Money,
}

impl SalesReport<'_> {
    /// No sale matched ("no data").
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

impl Inventory {
    /// Builds a report over the sales history.
    pub fn generate_report(&self, filter: &ReportFilter) -> SalesReport<'_> {
        let sales: Vec<&Sale> = self.sales.iter().filter(|s| filter.matches(s)).collect();
        let total_revenue: Money = sales.iter().map(|s| s.total_amount).sum();

        debug!(matched = sales.len(), of = self.sales.len(), "Generated report");
        SalesReport {
            sales,
            total_revenue,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Percent;
    use crate::types::{Product, SaleLine};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Three sales: A on Mar 1, B on Mar 2 (late evening), A+B on Mar 3.
    fn inventory_with_sales() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.add_product(Product::new("A", "Apple", Money::from_cents(100), 100));
        inventory.add_product(Product::new("B", "Bread", Money::from_cents(300), 100));

        let sell = |inv: &mut Inventory, codes: &[&str], at: chrono::NaiveDateTime| {
            let lines = codes
                .iter()
                .map(|c| SaleLine::from_product(inv.product(c).unwrap(), 1))
                .collect();
            inv.make_sale_at(lines, "cash", Percent::zero(), Percent::zero(), at)
                .unwrap();
        };

        sell(&mut inventory, &["A"], day(2024, 3, 1).and_hms_opt(9, 0, 0).unwrap());
        sell(&mut inventory, &["B"], day(2024, 3, 2).and_hms_opt(23, 59, 59).unwrap());
        sell(&mut inventory, &["A", "B"], day(2024, 3, 3).and_hms_opt(12, 0, 0).unwrap());
        inventory
    }

    #[test]
    fn test_no_filters_returns_full_history() {
        let inventory = inventory_with_sales();
        let report = inventory.generate_report(&ReportFilter::default());

        assert_eq!(report.sales.len(), 3);
        assert_eq!(report.total_revenue.cents(), 100 + 300 + 400);
    }

    #[test]
    fn test_product_code_filter() {
        let inventory = inventory_with_sales();
        let filter = ReportFilter {
            product_code: Some("B".to_string()),
            ..ReportFilter::default()
        };

        let report = inventory.generate_report(&filter);
        assert_eq!(report.sales.len(), 2);
        assert!(report.sales.iter().all(|s| s.contains_code("B")));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let inventory = inventory_with_sales();
        let filter = ReportFilter {
            start_date: Some(day(2024, 3, 2)),
            end_date: Some(day(2024, 3, 2)),
            product_code: None,
        };

        // The 23:59:59 sale on the end day is included
        let report = inventory.generate_report(&filter);
        assert_eq!(report.sales.len(), 1);
        assert_eq!(report.total_revenue.cents(), 300);
    }

    #[test]
    fn test_open_ended_ranges() {
        let inventory = inventory_with_sales();

        let from_second = ReportFilter {
            start_date: Some(day(2024, 3, 2)),
            ..ReportFilter::default()
        };
        assert_eq!(inventory.generate_report(&from_second).sales.len(), 2);

        let until_first = ReportFilter {
            end_date: Some(day(2024, 3, 1)),
            ..ReportFilter::default()
        };
        assert_eq!(inventory.generate_report(&until_first).sales.len(), 1);
    }

    #[test]
    fn test_no_data() {
        let inventory = inventory_with_sales();
        let filter = ReportFilter {
            start_date: Some(day(2025, 1, 1)),
            ..ReportFilter::default()
        };

        let report = inventory.generate_report(&filter);
        assert!(report.is_empty());
        assert_eq!(report.total_revenue, Money::zero());
    }
}
