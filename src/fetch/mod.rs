//! HTTP boundary: one shared client, bounded retries, cached pages.

pub mod npr;
pub mod usda;

use crate::error::FetchError;
use reqwest::Client;
use scraper::ElementRef;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client. The timeout bounds every request so a
/// hanging upstream cannot stall the whole run.
pub fn client() -> Result<Client, FetchError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// GET `url` and return the body, retrying transient failures.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => return Ok(body),
                Err(_) if attempt < MAX_RETRIES => {
                    warn!(url, attempt, "body read failed; retrying");
                    sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            },
            Ok(resp) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: resp.status(),
                })
            }
            Err(_) if attempt < MAX_RETRIES => {
                warn!(url, attempt, "request failed; retrying");
                sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Concatenated, trimmed text of one element.
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
