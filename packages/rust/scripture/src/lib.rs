//! Passage text fetchers.
//!
//! This crate provides:
//! - [`api`]: structured JSON API fetcher
//! - [`scrape`]: HTML passage-page scraper with ordered container strategies
//! - [`PassageSource`]: per-language choice between the two
//!
//! Fetchers never fail: a failed fetch yields a single error segment so the
//! post still goes out with an explanation in place of the text.

pub mod api;
mod clean;
pub mod scrape;

use dailybread_shared::{
    DailyBreadError, LanguageConfig, Result, SourceKind, SourcesConfig, VerseSegment,
};

pub use api::{ApiFetcher, parse_api_body};
pub use scrape::{ExtractMethod, Extraction, PassageScraper, extract_passage, passage_link};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("DailyBread/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Short description of a fetch failure for the error segment.
fn failure_detail(err: &DailyBreadError) -> String {
    match err {
        DailyBreadError::Network(msg) => msg.clone(),
        DailyBreadError::Parse { message } => message.clone(),
        other => other.to_string(),
    }
}

/// Where one language's passage text comes from.
pub enum PassageSource {
    Api(ApiFetcher),
    Scrape(PassageScraper),
}

impl PassageSource {
    /// Build the fetcher a language block asks for.
    ///
    /// Scraping uses `translation` as the version code, defaulting to the
    /// link version.
    pub fn from_config(language: &LanguageConfig, sources: &SourcesConfig) -> Result<Self> {
        match language.source {
            SourceKind::Api => Ok(Self::Api(ApiFetcher::new(
                &sources.bible_api_url,
                language.translation.clone(),
            )?)),
            SourceKind::Scrape => {
                let version = language
                    .translation
                    .clone()
                    .unwrap_or_else(|| language.link_version.clone());
                Ok(Self::Scrape(PassageScraper::new(&sources.passage_url, version)?))
            }
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Api(_) => SourceKind::Api,
            Self::Scrape(_) => SourceKind::Scrape,
        }
    }

    /// Fetch the passage; see [`ApiFetcher::fetch`] and [`PassageScraper::fetch`].
    pub async fn fetch(&self, reference: &str) -> Vec<VerseSegment> {
        match self {
            Self::Api(fetcher) => fetcher.fetch(reference).await,
            Self::Scrape(scraper) => scraper.fetch(reference).await,
        }
    }
}
