//! # Spreadsheet Codec
//!
//! Maps an [`Inventory`] to and from a grid of cells. File access lives in
//! `tally-sheet`; this module only knows rows and columns.
//!
//! ## Sheet Layout
//! ```text
//! ┌──────┬──────────────────────────────┬──────────────┬────────────────┬──────────┬──────────┬─────────────────────┐
//! │ row  │ A                            │ B            │ C              │ D        │ E        │ F                   │
//! ├──────┼──────────────────────────────┼──────────────┼────────────────┼──────────┼──────────┼─────────────────────┤
//! │ 1    │ code                         │ name         │ price          │ quantity │          │                     │
//! │ 2..  │ A                            │ Apple        │ 10.5           │ 3        │          │                     │
//! │ n+2  │ (blank)                      │              │                │          │          │                     │
//! │ n+3  │ products                     │ total_amount │ payment_method │ discount │ tax_rate │ date                │
//! │ n+4..│ Code: A, Name: Apple, ...    │ 22           │ cash           │ 0        │ 10       │ 2024-03-15 14:30:00 │
//! └──────┴──────────────────────────────┴──────────────┴────────────────┴──────────┴──────────┴─────────────────────┘
//! ```
//! `n` is the number of products. Header text and row offsets are part of
//! the file format and must not change.
//!
//! ## Line-Items Cell
//! One line item per line:
//! ```text
//! Code: <code>, Name: <name>, Price: <price>, Quantity: <quantity>
//! ```
//! Inside `<code>` and `<name>`, `\` `,` newline and carriage return are
//! written as `\\` `\,` `\n` `\r`, so fields split on unescaped commas and
//! records split on raw newlines. Unescaped legacy cells still decode: an
//! unkeyed fragment is glued back onto the field before it.

use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use crate::money::{Money, Percent};
use crate::types::{Inventory, Product, Sale, SaleLine};
use crate::DATE_FORMAT;

/// Header row of the products section.
pub const PRODUCT_HEADERS: [&str; 4] = ["code", "name", "price", "quantity"];

/// Header row of the sales section.
pub const SALE_HEADERS: [&str; 6] = [
    "products",
    "total_amount",
    "payment_method",
    "discount",
    "tax_rate",
    "date",
];

const LINE_KEYS: [&str; 4] = ["Code", "Name", "Price", "Quantity"];

// =============================================================================
// Cells
// =============================================================================

/// One spreadsheet cell, as far as the codec cares.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Empty cells and empty strings both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Reads the cell as text; whole numbers print without a fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn row_is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

fn cell(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&Cell::Empty)
}

// =============================================================================
// Errors and Warnings
// =============================================================================

/// The grid cannot be turned into an inventory at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A section header does not match the file format.
    #[error("Row {row}: expected header [{expected}], found [{found}]")]
    UnexpectedHeader {
        row: usize,
        expected: String,
        found: String,
    },

    /// A sale date is not in the `YYYY-MM-DD HH:MM:SS` pattern.
    #[error("Row {row}: sale date {value:?} is not a valid timestamp")]
    MalformedDate { row: usize, value: String },
}

/// A field that could not be coerced and was replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecWarning {
    /// 1-based spreadsheet row.
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}, {}: could not read {:?}, using 0",
            self.row, self.column, self.value
        )
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    pub inventory: Inventory,
    pub warnings: Vec<CodecWarning>,
}

// =============================================================================
// Encode
// =============================================================================

/// Lays an inventory out as rows of cells.
pub fn encode(inventory: &Inventory) -> Vec<Vec<Cell>> {
    let mut rows = Vec::with_capacity(inventory.products.len() + inventory.sales.len() + 3);

    rows.push(PRODUCT_HEADERS.iter().map(|h| Cell::text(*h)).collect());
    for product in &inventory.products {
        rows.push(vec![
            Cell::text(product.code.as_str()),
            Cell::text(product.name.as_str()),
            Cell::Number(product.price.to_f64()),
            Cell::Number(f64::from(product.quantity)),
        ]);
    }

    rows.push(Vec::new());

    rows.push(SALE_HEADERS.iter().map(|h| Cell::text(*h)).collect());
    for sale in &inventory.sales {
        rows.push(vec![
            Cell::Text(encode_lines(&sale.lines)),
            Cell::Number(sale.total_amount.to_f64()),
            Cell::text(sale.payment_method.as_str()),
            Cell::Number(sale.discount.to_f64()),
            Cell::Number(sale.tax_rate.to_f64()),
            Cell::Text(sale.date.format(DATE_FORMAT).to_string()),
        ]);
    }

    rows
}

/// Renders the line-items cell of one sale.
pub fn encode_lines(lines: &[SaleLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "Code: {}, Name: {}, Price: {}, Quantity: {}",
                escape(&line.code),
                escape(&line.name),
                line.price,
                line.quantity
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// Decode
// =============================================================================

/// Reads an inventory back from rows of cells.
///
/// ## Behavior
/// - An all-blank grid is a fresh, empty inventory
/// - Products run from row 2 to the first blank row
/// - Sales run from row `products + 4` to the first blank row
/// - Unreadable numbers become 0 and are reported in [`Decoded::warnings`]
///
/// ## Errors
/// - `UnexpectedHeader` if either header row is wrong
/// - `MalformedDate` if a sale date does not parse
pub fn decode(rows: &[Vec<Cell>]) -> Result<Decoded, CodecError> {
    let mut decoded = Decoded::default();
    if rows.iter().all(|row| row_is_blank(row)) {
        return Ok(decoded);
    }

    expect_header(rows, 0, &PRODUCT_HEADERS)?;

    let warnings = &mut decoded.warnings;
    let products: Vec<Product> = rows
        .iter()
        .enumerate()
        .skip(1)
        .take_while(|(_, row)| !row_is_blank(row))
        .map(|(idx, row)| decode_product(row, idx + 1, warnings))
        .collect();

    // header, products, blank separator
    let sales_header = products.len() + 2;
    let mut sales = Vec::new();
    if rows.get(sales_header).is_some_and(|row| !row_is_blank(row)) {
        expect_header(rows, sales_header, &SALE_HEADERS)?;

        for (idx, row) in rows.iter().enumerate().skip(sales_header + 1) {
            if row_is_blank(row) {
                break;
            }
            sales.push(decode_sale(row, idx + 1, warnings)?);
        }
    }

    debug!(
        products = products.len(),
        sales = sales.len(),
        warnings = warnings.len(),
        "Decoded sheet"
    );
    decoded.inventory = Inventory { products, sales };
    Ok(decoded)
}

fn expect_header(rows: &[Vec<Cell>], idx: usize, expected: &[&str]) -> Result<(), CodecError> {
    let row = rows.get(idx).map(Vec::as_slice).unwrap_or(&[]);
    let found: Vec<String> = (0..expected.len())
        .map(|col| cell(row, col).as_text().unwrap_or_default())
        .collect();

    if found.iter().zip(expected).all(|(f, e)| f.trim() == *e) {
        return Ok(());
    }

    Err(CodecError::UnexpectedHeader {
        row: idx + 1,
        expected: expected.join(", "),
        found: found.join(", "),
    })
}

fn decode_product(row: &[Cell], sheet_row: usize, warnings: &mut Vec<CodecWarning>) -> Product {
    Product {
        code: cell(row, 0).as_text().unwrap_or_default(),
        name: cell(row, 1).as_text().unwrap_or_default(),
        price: money_cell(cell(row, 2), sheet_row, "price", warnings),
        quantity: quantity_cell(cell(row, 3), sheet_row, "quantity", warnings),
    }
}

fn decode_sale(
    row: &[Cell],
    sheet_row: usize,
    warnings: &mut Vec<CodecWarning>,
) -> Result<Sale, CodecError> {
    let lines = cell(row, 0)
        .as_text()
        .map(|text| decode_lines(&text, sheet_row, warnings))
        .unwrap_or_default();

    let date_cell = cell(row, 5);
    let raw_date = date_cell.as_text().unwrap_or_default();
    let date = match date_cell {
        Cell::Text(text) => NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).ok(),
        _ => None,
    }
    .ok_or(CodecError::MalformedDate {
        row: sheet_row,
        value: raw_date,
    })?;

    Ok(Sale {
        lines,
        total_amount: money_cell(cell(row, 1), sheet_row, "total_amount", warnings),
        payment_method: cell(row, 2).as_text().unwrap_or_default(),
        discount: percent_cell(cell(row, 3), sheet_row, "discount", warnings),
        tax_rate: percent_cell(cell(row, 4), sheet_row, "tax_rate", warnings),
        date,
    })
}

/// Parses a line-items cell. Blank lines are skipped.
pub fn decode_lines(text: &str, sheet_row: usize, warnings: &mut Vec<CodecWarning>) -> Vec<SaleLine> {
    text.split('\n')
        .filter(|record| !record.trim().is_empty())
        .map(|record| decode_line(record, sheet_row, warnings))
        .collect()
}

fn decode_line(record: &str, sheet_row: usize, warnings: &mut Vec<CodecWarning>) -> SaleLine {
    let mut values: [Option<String>; 4] = Default::default();
    let mut last_slot: Option<usize> = None;

    for (pos, raw) in split_fields(record).into_iter().enumerate() {
        let raw = if pos == 0 {
            raw
        } else {
            raw.strip_prefix(' ').unwrap_or(raw)
        };

        if let Some((slot, value)) = keyed_field(raw) {
            values[slot] = Some(unescape(value));
            last_slot = Some(slot);
            continue;
        }

        match last_slot {
            // Legacy cell: a comma inside a value was never escaped
            Some(slot) => {
                if let Some(value) = values[slot].as_mut() {
                    value.push_str(", ");
                    value.push_str(&unescape(raw));
                }
            }
            // No keys at all: take fragments by position
            None => {
                if let Some(slot) = values.get_mut(pos) {
                    *slot = Some(unescape(raw));
                }
            }
        }
    }

    let [code, name, price, quantity] = values;
    SaleLine {
        code: code.unwrap_or_default(),
        name: name.unwrap_or_default(),
        price: price
            .map(|p| parse_money(&p).unwrap_or_else(|| defaulted(warnings, sheet_row, "products", p, Money::zero())))
            .unwrap_or_default(),
        quantity: quantity
            .map(|q| parse_quantity(&q).unwrap_or_else(|| defaulted(warnings, sheet_row, "products", q, 0)))
            .unwrap_or_default(),
    }
}

fn keyed_field(raw: &str) -> Option<(usize, &str)> {
    LINE_KEYS.iter().enumerate().find_map(|(slot, key)| {
        raw.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(": "))
            .map(|value| (slot, value))
    })
}

/// Splits on commas that are not preceded by a backslash escape.
fn split_fields(record: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, ch) in record.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            ',' => {
                fields.push(&record[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    fields.push(&record[start..]);
    fields
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

// =============================================================================
// Numeric Coercion
// =============================================================================

fn defaulted<T>(warnings: &mut Vec<CodecWarning>, row: usize, column: &'static str, value: String, fallback: T) -> T {
    warnings.push(CodecWarning { row, column, value });
    fallback
}

fn parse_money(text: &str) -> Option<Money> {
    text.parse::<Money>()
        .ok()
        .or_else(|| text.trim().parse::<f64>().ok().and_then(Money::from_f64_rounded))
}

fn parse_quantity(text: &str) -> Option<u32> {
    let text = text.trim();
    text.parse::<u32>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(whole_u32))
}

fn whole_u32(n: f64) -> Option<u32> {
    (n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}

fn money_cell(cell: &Cell, row: usize, column: &'static str, warnings: &mut Vec<CodecWarning>) -> Money {
    let parsed = match cell {
        Cell::Number(n) => Money::from_f64_rounded(*n),
        Cell::Text(s) => parse_money(s),
        Cell::Empty => None,
    };
    parsed.unwrap_or_else(|| defaulted(warnings, row, column, cell.as_text().unwrap_or_default(), Money::zero()))
}

fn percent_cell(cell: &Cell, row: usize, column: &'static str, warnings: &mut Vec<CodecWarning>) -> Percent {
    let parsed = match cell {
        Cell::Number(n) => Percent::from_f64_rounded(*n),
        Cell::Text(s) => s
            .parse::<Percent>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(Percent::from_f64_rounded)),
        Cell::Empty => None,
    };
    parsed.unwrap_or_else(|| defaulted(warnings, row, column, cell.as_text().unwrap_or_default(), Percent::zero()))
}

fn quantity_cell(cell: &Cell, row: usize, column: &'static str, warnings: &mut Vec<CodecWarning>) -> u32 {
    let parsed = match cell {
        Cell::Number(n) => whole_u32(*n),
        Cell::Text(s) => parse_quantity(s),
        Cell::Empty => None,
    };
    parsed.unwrap_or_else(|| defaulted(warnings, row, column, cell.as_text().unwrap_or_default(), 0))
}

// =============================================================================
// Unit Tests
// =============================================================================
