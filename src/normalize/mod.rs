//! Pure scalar transforms between report formatting and typed values.

use crate::error::NormalizeError;
use crate::extract::excel::Cell;
use tracing::debug;

/// Strip thousands separators and parse an integer count
/// (`"54,321"` → `54321`).
pub fn parse_count(raw: &str) -> Result<i64, NormalizeError> {
    let cleaned = raw.trim().replace(',', "");
    cleaned
        .parse()
        .map_err(|_| NormalizeError::ParseFailed(raw.to_string()))
}

/// Strip currency formatting and parse an integer amount
/// (`"$54,321"` → `54321`).
pub fn parse_currency(raw: &str) -> Result<i64, NormalizeError> {
    let cleaned = raw.trim().replace('$', "").replace(',', "");
    cleaned
        .parse()
        .map_err(|_| NormalizeError::ParseFailed(raw.to_string()))
}

/// Convert a unit fraction to a percentage rounded to two decimals
/// (`0.453` → `45.3`).
pub fn to_percent(cell: &Cell) -> Result<f64, NormalizeError> {
    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| NormalizeError::ParseFailed(s.clone()))?,
        Cell::Empty => return Err(NormalizeError::ParseFailed(String::new())),
    };
    Ok((value * 100.0 * 100.0).round() / 100.0)
}

/// Percent conversion with the pass-through the reports rely on: a value
/// that does not parse as a number flows through unchanged.
pub fn percent_or_keep(cell: &Cell) -> Cell {
    match to_percent(cell) {
        Ok(percent) => Cell::Number(percent),
        Err(err) => {
            debug!(%err, "keeping unconverted cell");
            cell.clone()
        }
    }
}

/// Integer value of a cell: numbers round, formatted text parses.
pub fn cell_int(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Number(v) => Some(v.round() as i64),
        Cell::Text(s) => parse_count(s).ok(),
        Cell::Empty => None,
    }
}

/// Dollar amount of a cell: numbers round, `"$1,234"`-style text parses.
pub fn cell_currency(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Number(v) => Some(v.round() as i64),
        Cell::Text(s) => parse_currency(s).ok(),
        Cell::Empty => None,
    }
}

/// Rate value of a cell, for columns already expressed as percentages.
pub fn cell_rate(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => s.trim().parse().ok(),
        Cell::Empty => None,
    }
}

/// Reduce a report's place label to the bare county name. The reports
/// label Michigan counties three different ways (`"Alcona"`,
/// `"Alcona County"`, `"Alcona County, MI"`).
pub fn county_name(raw: &str) -> String {
    let before_comma = raw.split(',').next().unwrap_or(raw).trim();
    before_comma
        .strip_suffix("County")
        .unwrap_or(before_comma)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_strips_separators() {
        assert_eq!(parse_count("54,321").unwrap(), 54_321);
        assert_eq!(parse_count(" 7 ").unwrap(), 7);
        assert_eq!(
            parse_count("n/a").unwrap_err(),
            NormalizeError::ParseFailed("n/a".to_string())
        );
    }

    #[test]
    fn currency_strips_symbol_and_separators() {
        assert_eq!(parse_currency("$54,321").unwrap(), 54_321);
        assert_eq!(parse_currency("54321").unwrap(), 54_321);
        assert!(parse_currency("").is_err());
    }

    #[test]
    fn percent_scales_and_rounds_to_two_decimals() {
        assert_eq!(to_percent(&Cell::Number(0.453)).unwrap(), 45.3);
        assert_eq!(to_percent(&Cell::Number(0.12345)).unwrap(), 12.35);
        assert_eq!(to_percent(&Cell::Text("0.5".to_string())).unwrap(), 50.0);
    }

    #[test]
    fn percent_passes_non_numeric_through_unchanged() {
        let cell = Cell::Text("suppressed".to_string());
        assert_eq!(percent_or_keep(&cell), cell);
        assert_eq!(percent_or_keep(&Cell::Number(0.1)), Cell::Number(10.0));
        assert_eq!(
            to_percent(&cell).unwrap_err(),
            NormalizeError::ParseFailed("suppressed".to_string())
        );
    }

    #[test]
    fn county_labels_reduce_to_bare_names() {
        assert_eq!(county_name("Alcona"), "Alcona");
        assert_eq!(county_name("Alcona County"), "Alcona");
        assert_eq!(county_name("Alcona County, MI"), "Alcona");
        assert_eq!(county_name(" Bay County , MI"), "Bay");
    }
}
