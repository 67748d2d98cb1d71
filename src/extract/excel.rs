//! Fixed-range spreadsheet extraction.
//!
//! Every report is read by sheet name and A1-style cell range, exactly as
//! downloaded. There is no schema validation beyond the range bounds: a
//! layout change upstream shifts every downstream value.

use crate::error::ExtractError;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// A scalar cell value lifted out of a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

static CELL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([1-9][0-9]*)$").expect("cell reference pattern"));

/// Read the cells of `range` (e.g. `"A6:A56"`) from `sheet`, row-major.
pub fn read_range(workbook: &Path, sheet: &str, range: &str) -> Result<Vec<Cell>, ExtractError> {
    let mut wb: Xlsx<_> = open_workbook(workbook).map_err(|source| ExtractError::Workbook {
        path: workbook.to_path_buf(),
        source,
    })?;
    let full = wb
        .worksheet_range(sheet)
        .map_err(|_| ExtractError::MissingSheet(sheet.to_string()))?;
    cells_in(&full, range)
}

/// Range slicing, separated from file access so it is testable in memory.
pub(crate) fn cells_in(sheet: &Range<Data>, range: &str) -> Result<Vec<Cell>, ExtractError> {
    let (start_ref, end_ref) = range
        .split_once(':')
        .ok_or_else(|| ExtractError::BadRange(range.to_string()))?;
    let start = parse_cell_ref(start_ref)?;
    let end = parse_cell_ref(end_ref)?;
    if end.0 < start.0 || end.1 < start.1 {
        return Err(ExtractError::BadRange(range.to_string()));
    }

    let sub = sheet.range(start, end);
    Ok(sub
        .rows()
        .flat_map(|row| row.iter().map(cell_from))
        .collect())
}

/// Parse an A1-style reference into a zero-based (row, column) pair.
fn parse_cell_ref(reference: &str) -> Result<(u32, u32), ExtractError> {
    let caps = CELL_REF
        .captures(reference.trim())
        .ok_or_else(|| ExtractError::BadRange(reference.to_string()))?;
    let col = caps[1]
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1))
        - 1;
    let row: u32 = caps[2]
        .parse()
        .map_err(|_| ExtractError::BadRange(reference.to_string()))?;
    Ok((row - 1, col))
}

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.trim().to_string()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Dates, durations and error cells never appear in these reports.
        _ => Cell::Empty,
    }
}
