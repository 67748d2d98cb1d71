//! Dataset index scraped from the USDA ERS county-level data sets page.
//!
//! The page lists its datasets in one indented block; each list item's
//! text is the display name and the `data-id` on its link slots into the
//! report-viewer URL.

use crate::cache::PageCache;
use crate::error::FetchError;
use crate::fetch::{self, element_text};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

pub const DATASETS_URL: &str = "https://www.ers.usda.gov/data-products/county-level-data-sets/";
const REPORT_VIEWER_URL: &str = "https://data.ers.usda.gov/reports.aspx";

/// One dataset page, in document order.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub name: String,
    pub url: String,
}

/// Fetch the index page through the cache and parse it.
pub async fn dataset_index(
    client: &Client,
    cache: &mut PageCache,
) -> Result<Vec<Dataset>, FetchError> {
    let html = cache
        .get_or_fetch(DATASETS_URL, || fetch::fetch_page(client, DATASETS_URL))
        .await?;
    parse_dataset_index(&html)
}

/// Parse dataset names and report ids out of the fixed list block.
pub fn parse_dataset_index(html: &str) -> Result<Vec<Dataset>, FetchError> {
    let list_sel = Selector::parse(r#"div[style="margin-left: 4em;"] ul"#)
        .expect("selector should parse");
    let item_sel = Selector::parse("li").expect("selector should parse");
    let link_sel = Selector::parse("a[data-id]").expect("selector should parse");

    let doc = Html::parse_document(html);
    let list = doc
        .select(&list_sel)
        .next()
        .ok_or(FetchError::MissingElement("dataset list block"))?;

    let names: Vec<String> = list.select(&item_sel).map(element_text).collect();
    let ids: Vec<&str> = list
        .select(&link_sel)
        .filter_map(|link| link.value().attr("data-id"))
        .collect();

    if ids.len() != names.len() {
        return Err(FetchError::LengthMismatch {
            context: "dataset link ids",
            expected: names.len(),
            found: ids.len(),
        });
    }

    names
        .into_iter()
        .zip(ids)
        .map(|(name, id)| {
            let url = Url::parse_with_params(REPORT_VIEWER_URL, [("ID", id)])?;
            Ok(Dataset {
                name,
                url: url.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div style="margin-left: 4em;">
            <ul>
              <li><a data-id="17827">Poverty</a></li>
              <li><a data-id="17828">Unemployment and median household income</a></li>
              <li><a data-id="17829">Education</a></li>
            </ul>
          </div>
        </body></html>
    "#;

    #[test]
    fn parses_datasets_in_document_order() {
        let datasets = parse_dataset_index(PAGE).unwrap();
        assert_eq!(datasets.len(), 3);
        assert_eq!(datasets[0].name, "Poverty");
        assert_eq!(
            datasets[0].url,
            "https://data.ers.usda.gov/reports.aspx?ID=17827"
        );
        assert_eq!(datasets[2].name, "Education");
    }

    #[test]
    fn missing_list_block_is_an_error() {
        let err = parse_dataset_index("<html><ul></ul></html>").unwrap_err();
        assert!(matches!(err, FetchError::MissingElement(_)));
    }
}
