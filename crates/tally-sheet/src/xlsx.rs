//! # Workbook ⇄ Grid
//!
//! Moves a grid of [`Cell`]s in and out of an xlsx file. Layout rules live
//! in `tally_core::codec`; this module only maps cell types.
//!
//! ## Cell Mapping
//! ```text
//! ┌───────────────────────────┬──────────────────────────────────────────┐
//! │ xlsx (calamine::Data)     │ Cell                                     │
//! ├───────────────────────────┼──────────────────────────────────────────┤
//! │ Empty                     │ Empty                                    │
//! │ String                    │ Text  (_xHHHH_ escapes undone)           │
//! │ Float, Int                │ Number                                   │
//! │ DateTime, DateTimeIso     │ Text  "YYYY-MM-DD HH:MM:SS"              │
//! │ Bool, Error, DurationIso  │ Text  (as displayed)                     │
//! └───────────────────────────┴──────────────────────────────────────────┘
//! ```
//! Writing is the reverse for `Text` and `Number`. Empty cells and empty
//! strings are not written.

use std::path::Path;

use calamine::{open_workbook, Data, ExcelDateTime, Reader, Xlsx};
use chrono::{Duration, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use tally_core::{Cell, DATE_FORMAT};
use tracing::debug;

use crate::error::{SheetError, SheetResult};

// =============================================================================
// Read
// =============================================================================

/// Reads the first worksheet of the workbook at `path`.
///
/// Rows and columns are absolute: `grid[0][0]` is cell A1 even when the
/// sheet's used range starts further down.
pub fn read_grid(path: &Path) -> SheetResult<Vec<Vec<Cell>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetError::NoWorksheet(path.to_path_buf()))??;

    let Some((last_row, last_col)) = range.end() else {
        return Ok(Vec::new());
    };

    let grid: Vec<Vec<Cell>> = (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map_or(Cell::Empty, to_cell))
                .collect()
        })
        .collect();

    debug!(path = %path.display(), rows = grid.len(), "Read worksheet");
    Ok(grid)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(unescape_ooxml(s)),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_datetime_text(dt).map_or(Cell::Number(dt.as_f64()), Cell::Text),
        Data::DateTimeIso(s) => Cell::Text(iso_datetime_text(s)),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Serial dates are fractional days; round to the nearest second.
fn excel_datetime_text(dt: &ExcelDateTime) -> Option<String> {
    let at = dt.as_datetime()?;
    let rounded = (at + Duration::milliseconds(500)).with_nanosecond(0)?;
    Some(rounded.format(DATE_FORMAT).to_string())
}

/// Undoes the `_xHHHH_` escaping xlsx writers apply to shared strings.
///
/// Control characters are stored as `_x000D_` and a literal `_xHHHH_` as
/// `_x005F_xHHHH_`. calamine hands both back verbatim. Scanning left to
/// right, each complete escape becomes its character exactly once.
fn unescape_ooxml(raw: &str) -> String {
    const ESCAPE_LEN: usize = "_x0000_".len();

    if !raw.contains("_x") {
        return raw.to_string();
    }

    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let escaped = bytes.get(i..i + ESCAPE_LEN).and_then(|window| {
            if !window.starts_with(b"_x") || window[ESCAPE_LEN - 1] != b'_' {
                return None;
            }
            let hex = std::str::from_utf8(&window[2..6]).ok()?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        });

        match escaped {
            Some(ch) => {
                out.push(ch);
                i += ESCAPE_LEN;
            }
            None => {
                // `i` always sits on a char boundary: escapes are ASCII.
                let Some(ch) = raw[i..].chars().next() else { break };
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

fn iso_datetime_text(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|at| at.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

// =============================================================================
// Write
// =============================================================================

/// Writes `grid` as the only worksheet of a new workbook at `path`.
///
/// An existing file at `path` is overwritten.
pub fn write_grid(path: &Path, sheet_name: &str, grid: &[Vec<Cell>]) -> SheetResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (r, cells) in grid.iter().enumerate() {
        let row = RowNum::try_from(r).map_err(|_| SheetError::GridTooLarge { rows: grid.len() })?;

        for (c, cell) in cells.iter().enumerate() {
            let col = ColNum::try_from(c).map_err(|_| SheetError::GridTooLarge { rows: grid.len() })?;

            match cell {
                Cell::Empty => {}
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, col, *n)?;
                }
            }
        }
    }

    workbook.save(path)?;
    debug!(path = %path.display(), rows = grid.len(), "Wrote worksheet");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Format;

    #[test]
    fn test_grid_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.xlsx");
        let grid = vec![
            vec![Cell::text("code"), Cell::text("name")],
            vec![Cell::text("A"), Cell::Number(2.5)],
            vec![],
            vec![Cell::text("x\ny"), Cell::Empty, Cell::Number(-3.0)],
        ];

        write_grid(&path, "Sheet", &grid).unwrap();
        let read = read_grid(&path).unwrap();

        assert_eq!(read.len(), 4);
        assert_eq!(read[0], vec![Cell::text("code"), Cell::text("name"), Cell::Empty]);
        assert_eq!(read[1], vec![Cell::text("A"), Cell::Number(2.5), Cell::Empty]);
        assert!(read[2].iter().all(Cell::is_blank));
        assert_eq!(read[3], vec![Cell::text("x\ny"), Cell::Empty, Cell::Number(-3.0)]);
    }

    #[test]
    fn test_date_cells_become_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let when = rust_xlsxwriter::ExcelDateTime::parse_from_str("2024-03-15 14:30:00").unwrap();
        let format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        worksheet.write_datetime_with_format(0, 0, &when, &format).unwrap();
        workbook.save(&path).unwrap();

        let read = read_grid(&path).unwrap();
        assert_eq!(read[0][0], Cell::text("2024-03-15 14:30:00"));
    }

    #[test]
    fn test_not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.xlsx");
        std::fs::write(&path, "plain text").unwrap();

        assert!(matches!(read_grid(&path), Err(SheetError::Read(_))));
    }

    #[test]
    fn test_unescape_ooxml() {
        assert_eq!(unescape_ooxml("a_x000D_b"), "a\rb");
        assert_eq!(unescape_ooxml("_x005F_x0041_"), "_x0041_");
        assert_eq!(unescape_ooxml("_x005f_x000d_"), "_x000d_");
        assert_eq!(unescape_ooxml("_x00"), "_x00");
        assert_eq!(unescape_ooxml("_xZZZZ_ é"), "_xZZZZ_ é");
        assert_eq!(unescape_ooxml("_xD800_"), "_xD800_");
        assert_eq!(unescape_ooxml("Apple"), "Apple");
    }

    #[test]
    fn test_escape_like_text_survives_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("escapes.xlsx");
        let texts = ["_x0041_", "a\rb", "_x005F_x000D_", "_x0041", "_x\r", "tab\there\u{1}"];
        let grid = vec![texts.iter().map(|t| Cell::text(*t)).collect::<Vec<_>>()];

        write_grid(&path, "Sheet", &grid).unwrap();
        let read = read_grid(&path).unwrap();

        assert_eq!(read, grid);
    }

    #[test]
    fn test_iso_datetime_text() {
        assert_eq!(iso_datetime_text("2024-03-15T14:30:00"), "2024-03-15 14:30:00");
        assert_eq!(iso_datetime_text("soon"), "soon");
    }
}
