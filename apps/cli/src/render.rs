//! Text rendering for listings, receipts and reports.

use tally_core::{Product, Sale, SalesReport};

pub fn product_line(product: &Product) -> String {
    format!(
        "Code: {}, Name: {}, Price: {}, Quantity: {}",
        product.code, product.name, product.price, product.quantity
    )
}

/// The whole catalog, in catalog order.
pub fn catalog(products: &[Product]) -> String {
    let mut out = vec!["\nCurrent inventory:".to_string()];
    if products.is_empty() {
        out.push("(no products)".to_string());
    }
    out.extend(products.iter().map(product_line));
    out.join("\n")
}

pub fn search_results(keyword: &str, hits: &[&Product]) -> String {
    if hits.is_empty() {
        return format!("No product name contains '{keyword}'.");
    }

    let mut out = vec!["\nSearch results:".to_string()];
    out.extend(hits.iter().map(|p| product_line(p)));
    out.join("\n")
}

/// ```text
/// Receipt:
/// Name: Apple, Quantity: 2, Price: 10.00
/// Total: 22.00, Discount: 0%, Tax: 10%, Payment method: cash
/// Sale recorded.
/// ```
pub fn receipt(sale: &Sale) -> String {
    let mut out = vec!["\nReceipt:".to_string()];
    out.extend(
        sale.lines
            .iter()
            .map(|l| format!("Name: {}, Quantity: {}, Price: {}", l.name, l.quantity, l.price)),
    );
    out.push(format!(
        "Total: {}, Discount: {}%, Tax: {}%, Payment method: {}",
        sale.total_amount, sale.discount, sale.tax_rate, sale.payment_method
    ));
    out.push("Sale recorded.".to_string());
    out.join("\n")
}

pub fn report(report: &SalesReport<'_>) -> String {
    if report.is_empty() {
        return "No sales match the report filters.".to_string();
    }

    let mut out = vec!["\nReport:".to_string()];
    out.extend(report.sales.iter().map(|sale| {
        format!(
            "Date: {}, Total: {}, Discount: {}%, Tax: {}%, Payment method: {}",
            sale.date.format(tally_core::DATE_FORMAT),
            sale.total_amount,
            sale.discount,
            sale.tax_rate,
            sale.payment_method
        )
    }));
    out.push(format!("Total revenue: {}", report.total_revenue));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::{Inventory, Money, Percent, ReportFilter, SaleLine};

    fn inventory_with_sale() -> Inventory {
        let mut inventory = Inventory::new();
        inventory.add_product(Product::new("A", "Apple", Money::from_cents(1000), 5));
        let line = SaleLine::from_product(&inventory.products[0], 2);
        let at = NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(9, 5, 0))
            .unwrap();
        inventory
            .make_sale_at(vec![line], "cash", Percent::zero(), Percent::from_bps(1000), at)
            .unwrap();
        inventory
    }

    #[test]
    fn test_receipt() {
        let inventory = inventory_with_sale();
        let text = receipt(&inventory.sales[0]);

        assert!(text.contains("Name: Apple, Quantity: 2, Price: 10.00"));
        assert!(text.contains("Total: 22.00, Discount: 0%, Tax: 10%, Payment method: cash"));
    }

    #[test]
    fn test_report() {
        let inventory = inventory_with_sale();
        let text = report(&inventory.generate_report(&ReportFilter::default()));

        assert!(text.contains("Date: 2024-03-15 09:05:00, Total: 22.00"));
        assert!(text.ends_with("Total revenue: 22.00"));

        let none = ReportFilter {
            product_code: Some("Z".to_string()),
            ..ReportFilter::default()
        };
        assert_eq!(
            report(&inventory.generate_report(&none)),
            "No sales match the report filters."
        );
    }

    #[test]
    fn test_catalog() {
        assert!(catalog(&[]).contains("(no products)"));

        let inventory = inventory_with_sale();
        assert!(catalog(inventory.products()).ends_with("Code: A, Name: Apple, Price: 10.00, Quantity: 3"));
    }
}
