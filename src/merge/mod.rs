//! Attribute-keyed assembly of the six socioeconomic source series.

use crate::error::ExtractError;
use crate::extract::excel::Cell;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// The merged per-place attribute set. Serde names match the derived JSON
/// exports consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocioRecord {
    #[serde(rename = "Population")]
    pub population: i64,
    #[serde(rename = "Median Household Income")]
    pub median_income: i64,
    #[serde(rename = "Poverty Rate")]
    pub poverty_rate: f64,
    #[serde(rename = "Unemployment Rate")]
    pub unemployment_rate: f64,
    #[serde(rename = "Completed HS Only Rate")]
    pub hs_only_rate: f64,
    #[serde(rename = "College Completion Rate")]
    pub college_rate: f64,
}

/// The six single-attribute inputs, each keyed by place name. Field
/// names, not argument order, bind a series to its attribute.
#[derive(Debug, Default)]
pub struct SocioSources {
    pub population: BTreeMap<String, i64>,
    pub median_income: BTreeMap<String, i64>,
    pub poverty_rate: BTreeMap<String, f64>,
    pub unemployment_rate: BTreeMap<String, f64>,
    pub hs_only_rate: BTreeMap<String, f64>,
    pub college_rate: BTreeMap<String, f64>,
}

/// Merge the six series into complete records. Only places present in all
/// six inputs survive; the rest are logged and dropped.
pub fn merge(sources: &SocioSources) -> BTreeMap<String, SocioRecord> {
    let mut names: BTreeSet<&String> = BTreeSet::new();
    names.extend(sources.population.keys());
    names.extend(sources.median_income.keys());
    names.extend(sources.poverty_rate.keys());
    names.extend(sources.unemployment_rate.keys());
    names.extend(sources.hs_only_rate.keys());
    names.extend(sources.college_rate.keys());

    let mut merged = BTreeMap::new();
    for name in names {
        match build_record(sources, name) {
            Some(record) => {
                merged.insert(name.clone(), record);
            }
            None => warn!(place = %name, "missing from at least one source; dropped"),
        }
    }
    merged
}

fn build_record(sources: &SocioSources, name: &str) -> Option<SocioRecord> {
    Some(SocioRecord {
        population: *sources.population.get(name)?,
        median_income: *sources.median_income.get(name)?,
        poverty_rate: *sources.poverty_rate.get(name)?,
        unemployment_rate: *sources.unemployment_rate.get(name)?,
        hs_only_rate: *sources.hs_only_rate.get(name)?,
        college_rate: *sources.college_rate.get(name)?,
    })
}

/// Pair a name column with a value column extracted from the same report,
/// keying converted values by place. Rows whose value does not convert
/// are logged and dropped.
pub fn keyed_series<T>(
    attribute: &'static str,
    names: &[Cell],
    values: &[Cell],
    convert: impl Fn(&Cell) -> Option<T>,
) -> Result<BTreeMap<String, T>, ExtractError> {
    if names.len() != values.len() {
        return Err(ExtractError::SeriesMismatch {
            names: names.len(),
            values: values.len(),
        });
    }

    let mut series = BTreeMap::new();
    for (name, value) in names.iter().zip(values) {
        let Some(place) = name.as_text() else {
            warn!(attribute, ?name, "skipping row with non-text place name");
            continue;
        };
        match convert(value) {
            Some(converted) => {
                series.insert(place.to_string(), converted);
            }
            None => warn!(attribute, place, ?value, "skipping unconvertible value"),
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one<T>(name: &str, value: T) -> BTreeMap<String, T> {
        BTreeMap::from([(name.to_string(), value)])
    }

    #[test]
    fn merges_all_six_attributes_for_a_shared_key() {
        let sources = SocioSources {
            population: one("Texas", 28_995_881),
            median_income: one("Texas", 61_874),
            poverty_rate: one("Texas", 13.6),
            unemployment_rate: one("Texas", 3.5),
            hs_only_rate: one("Texas", 24.7),
            college_rate: one("Texas", 29.9),
        };

        let merged = merge(&sources);
        assert_eq!(
            merged["Texas"],
            SocioRecord {
                population: 28_995_881,
                median_income: 61_874,
                poverty_rate: 13.6,
                unemployment_rate: 3.5,
                hs_only_rate: 24.7,
                college_rate: 29.9,
            }
        );
    }

    #[test]
    fn key_missing_from_one_source_is_excluded() {
        let mut sources = SocioSources {
            population: one("Texas", 1),
            median_income: one("Texas", 2),
            poverty_rate: one("Texas", 3.0),
            unemployment_rate: one("Texas", 4.0),
            hs_only_rate: one("Texas", 5.0),
            college_rate: one("Texas", 6.0),
        };
        sources.population.insert("Ohio".to_string(), 11_689_100);

        let merged = merge(&sources);
        assert_eq!(merged.len(), 1);
        assert!(merged.contains_key("Texas"));
        assert!(!merged.contains_key("Ohio"));
    }

    #[test]
    fn series_pairs_names_with_converted_values() {
        let names = vec![
            Cell::Text("Alabama".to_string()),
            Cell::Text("Alaska".to_string()),
            Cell::Empty,
        ];
        let values = vec![
            Cell::Number(4_903_185.0),
            Cell::Text("n/a".to_string()),
            Cell::Number(1.0),
        ];

        let series =
            keyed_series("population", &names, &values, crate::normalize::cell_int).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series["Alabama"], 4_903_185);
    }

    #[test]
    fn series_length_mismatch_is_an_error() {
        let names = vec![Cell::Text("Alabama".to_string())];
        let err = keyed_series("population", &names, &[], crate::normalize::cell_int).unwrap_err();
        assert!(matches!(err, ExtractError::SeriesMismatch { .. }));
    }
}
