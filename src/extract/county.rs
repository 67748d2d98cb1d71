//! County-level case/death snapshot CSV.
//!
//! Row layout: date, county, state, fips, cases, deaths. Counts are
//! cumulative as of each row's date; the as-of date of the newest rows is
//! baked into the downloaded file and not refreshed at run time.

use crate::error::ExtractError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct CountyRow {
    pub date: NaiveDate,
    pub county: String,
    pub state: String,
    pub fips: Option<u32>,
    pub cases: i64,
    pub deaths: Option<i64>,
}

/// Cumulative counts for one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseCounts {
    #[serde(rename = "Cases")]
    pub cases: i64,
    #[serde(rename = "Deaths")]
    pub deaths: i64,
}

pub fn read_county_rows(path: &Path) -> Result<Vec<CountyRow>, ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_county_rows(file)
}

pub fn parse_county_rows<R: Read>(reader: R) -> Result<Vec<CountyRow>, ExtractError> {
    let mut rows = Vec::new();
    for record in csv::Reader::from_reader(reader).deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Latest cumulative counts per county, keyed state → county. Rows are in
/// date order, so the last row for a county carries the snapshot counts.
pub fn state_county_summary(
    rows: &[CountyRow],
) -> BTreeMap<String, BTreeMap<String, CaseCounts>> {
    let mut summary: BTreeMap<String, BTreeMap<String, CaseCounts>> = BTreeMap::new();
    for row in rows {
        summary.entry(row.state.clone()).or_default().insert(
            row.county.clone(),
            CaseCounts {
                cases: row.cases,
                deaths: row.deaths.unwrap_or(0),
            },
        );
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "\
date,county,state,fips,cases,deaths
2020-05-01,Washtenaw,Michigan,26161,1000,50
2020-05-01,Unknown,Michigan,,12,
2020-05-02,Washtenaw,Michigan,26161,1100,55
2020-05-02,Travis,Texas,48453,2000,40
";

    #[test]
    fn parses_rows_with_empty_fips_and_deaths() {
        let rows = parse_county_rows(SNAPSHOT.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
        assert_eq!(rows[1].county, "Unknown");
        assert_eq!(rows[1].fips, None);
        assert_eq!(rows[1].deaths, None);
        assert_eq!(rows[3].fips, Some(48453));
    }

    #[test]
    fn summary_keeps_the_last_row_per_county() {
        let rows = parse_county_rows(SNAPSHOT.as_bytes()).unwrap();
        let summary = state_county_summary(&rows);
        assert_eq!(
            summary["Michigan"]["Washtenaw"],
            CaseCounts {
                cases: 1100,
                deaths: 55
            }
        );
        assert_eq!(
            summary["Michigan"]["Unknown"],
            CaseCounts {
                cases: 12,
                deaths: 0
            }
        );
        assert_eq!(summary["Texas"].len(), 1);
    }
}
