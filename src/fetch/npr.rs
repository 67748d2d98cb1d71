//! State-level case/death counts scraped from the NPR coronavirus table.
//!
//! The table is an iframe-embedded graphic; three fixed cell classes hold
//! the state names, confirmed-case counts and death counts as parallel
//! columns. The counts are cumulative as of the page's snapshot date.

use crate::cache::PageCache;
use crate::error::FetchError;
use crate::fetch::{self, element_text};
use crate::normalize;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

pub const STATE_TABLE_URL: &str = "https://apps.npr.org/dailygraphics/graphics/coronavirus-d3-us-map-20200312/table.html?initialWidth=1238&childId=responsive-embed-coronavirus-d3-us-map-20200312-table&parentTitle=Coronavirus%20Map%20And%20Graphics%3A%20Track%20The%20Spread%20In%20The%20U.S.%20%3A%20Shots%20-%20Health%20News%20%3A%20NPR&parentUrl=https%3A%2F%2Fwww.npr.org%2Fsections%2Fhealth-shots%2F2020%2F03%2F16%2F816707182%2Fmap-tracking-the-spread-of-the-coronavirus-in-the-u-s";

/// Cumulative counts for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    #[serde(rename = "Cases")]
    pub cases: i64,
    #[serde(rename = "Deaths")]
    pub deaths: i64,
}

/// Fetch the table through the cache and parse it.
pub async fn state_counts(
    client: &Client,
    cache: &mut PageCache,
) -> Result<BTreeMap<String, StateCounts>, FetchError> {
    let html = cache
        .get_or_fetch(STATE_TABLE_URL, || {
            fetch::fetch_page(client, STATE_TABLE_URL)
        })
        .await?;
    parse_state_table(&html)
}

/// Parse the three fixed cell columns and zip them into per-state counts.
pub fn parse_state_table(html: &str) -> Result<BTreeMap<String, StateCounts>, FetchError> {
    let name_sel =
        Selector::parse("div.cell.cell-inner.stateName").expect("selector should parse");
    let cases_sel =
        Selector::parse("div.cell.amt.confirmed.cell-inner").expect("selector should parse");
    let deaths_sel =
        Selector::parse("div.cell.amt.deaths.cell-inner").expect("selector should parse");

    let doc = Html::parse_document(html);

    let names: Vec<String> = doc.select(&name_sel).map(element_text).collect();
    if names.is_empty() {
        return Err(FetchError::MissingElement("state name cells"));
    }

    let cases = numeric_column(&doc, &cases_sel)?;
    let deaths = numeric_column(&doc, &deaths_sel)?;

    if cases.len() != names.len() {
        return Err(FetchError::LengthMismatch {
            context: "confirmed-case column",
            expected: names.len(),
            found: cases.len(),
        });
    }
    if deaths.len() != names.len() {
        return Err(FetchError::LengthMismatch {
            context: "death column",
            expected: names.len(),
            found: deaths.len(),
        });
    }

    Ok(names
        .into_iter()
        .zip(cases.into_iter().zip(deaths))
        .map(|(name, (cases, deaths))| (name, StateCounts { cases, deaths }))
        .collect())
}

fn numeric_column(doc: &Html, selector: &Selector) -> Result<Vec<i64>, FetchError> {
    doc.select(selector)
        .map(|cell| Ok(normalize::parse_count(&element_text(cell))?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
        <html><body>
          <div class="cell cell-inner stateName">New York</div>
          <div class="cell amt confirmed cell-inner">385,142</div>
          <div class="cell amt deaths cell-inner">24,686</div>
          <div class="cell cell-inner stateName">Michigan</div>
          <div class="cell amt confirmed cell-inner">58,999</div>
          <div class="cell amt deaths cell-inner">5,673</div>
        </body></html>
    "#;

    #[test]
    fn parses_states_in_table() {
        let counts = parse_state_table(TABLE).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts["New York"],
            StateCounts {
                cases: 385_142,
                deaths: 24_686
            }
        );
        assert_eq!(
            counts["Michigan"],
            StateCounts {
                cases: 58_999,
                deaths: 5_673
            }
        );
    }

    #[test]
    fn column_length_mismatch_is_an_error() {
        let html = r#"
            <div class="cell cell-inner stateName">New York</div>
            <div class="cell cell-inner stateName">Michigan</div>
            <div class="cell amt confirmed cell-inner">1</div>
            <div class="cell amt deaths cell-inner">2</div>
            <div class="cell amt deaths cell-inner">3</div>
        "#;
        let err = parse_state_table(html).unwrap_err();
        assert!(matches!(
            err,
            FetchError::LengthMismatch {
                context: "confirmed-case column",
                ..
            }
        ));
    }

    #[test]
    fn empty_page_is_missing_element() {
        let err = parse_state_table("<html></html>").unwrap_err();
        assert!(matches!(err, FetchError::MissingElement(_)));
    }
}
