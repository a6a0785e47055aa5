//! HTML passage-page fetcher.
//!
//! Requests `{passage_url}?search=<reference>&version=<code>` and hands the
//! page to [`extract_passage`].

mod extract;
mod strategies;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use dailybread_shared::{DailyBreadError, Result, VerseSegment};

pub use extract::{ExtractMethod, Extraction, extract_passage};
pub use strategies::{CONTAINER_STRATEGIES, ContainerStrategy, locate_container};

use crate::{REQUEST_TIMEOUT_SECS, failure_detail};

/// The passage site serves reduced markup to unknown agents.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Build the passage-page URL for a reference and version code.
///
/// Also used for the deep links placed in the chat message.
pub fn passage_link(page_url: &str, reference: &str, version: &str) -> Result<Url> {
    let mut url = Url::parse(page_url)
        .map_err(|e| DailyBreadError::config(format!("invalid passage URL '{page_url}': {e}")))?;
    url.query_pairs_mut()
        .append_pair("search", reference)
        .append_pair("version", version);
    Ok(url)
}

/// Scrapes passage text in one version from the passage site.
pub struct PassageScraper {
    client: Client,
    page_url: String,
    version: String,
}

impl PassageScraper {
    pub fn new(page_url: &str, version: impl Into<String>) -> Result<Self> {
        // Validate early so a bad config fails before any network activity.
        Url::parse(page_url)
            .map_err(|e| DailyBreadError::config(format!("invalid passage URL '{page_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DailyBreadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            page_url: page_url.to_string(),
            version: version.into(),
        })
    }

    /// Fetch and extract a passage. Failures come back as a single error segment.
    #[instrument(skip(self), fields(version = %self.version))]
    pub async fn fetch(&self, reference: &str) -> Vec<VerseSegment> {
        match self.try_fetch(reference).await {
            Ok(extraction) => {
                match (extraction.strategy, extraction.method) {
                    (Some(strategy), Some(method)) => info!(
                        strategy,
                        %method,
                        segments = extraction.segments.len(),
                        "passage scraped"
                    ),
                    _ => warn!(
                        strategy = ?extraction.strategy,
                        "passage page fetched but no text extracted"
                    ),
                }
                extraction.segments
            }
            Err(e) => {
                warn!(error = %e, "passage scrape failed");
                vec![VerseSegment::error(failure_detail(&e))]
            }
        }
    }

    async fn try_fetch(&self, reference: &str) -> Result<Extraction> {
        let url = passage_link(&self.page_url, reference, &self.version)?;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "passage page response");
        if status.as_u16() != 200 {
            return Err(DailyBreadError::Network(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: body read failed: {e}")))?;
        debug!(bytes = body.len(), "passage page downloaded");

        Ok(extract_passage(&body))
    }
}
