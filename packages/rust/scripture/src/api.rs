//! Structured scripture API fetcher (`GET {base}/{reference}`).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use dailybread_shared::{DailyBreadError, Result, VerseSegment};

use crate::clean::collapse_whitespace;
use crate::{REQUEST_TIMEOUT_SECS, USER_AGENT, failure_detail};

#[derive(Debug, Deserialize)]
struct ApiPassage {
    #[serde(default)]
    verses: Option<Vec<ApiVerse>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiVerse {
    verse: Value,
    #[serde(default)]
    text: String,
}

/// Fetches passages from a bible-api.com style JSON endpoint.
pub struct ApiFetcher {
    client: Client,
    base_url: Url,
    translation: Option<String>,
}

impl ApiFetcher {
    /// Create a fetcher for `base_url`, optionally pinned to a translation code.
    pub fn new(base_url: &str, translation: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DailyBreadError::config(format!("invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DailyBreadError::config(format!(
                "API URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DailyBreadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            translation,
        })
    }

    /// Request URL for a reference: the reference is one percent-encoded path segment.
    pub fn passage_url(&self, reference: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(reference);
        }
        if let Some(code) = &self.translation {
            url.query_pairs_mut().append_pair("translation", code);
        }
        url
    }

    /// Fetch a passage. Failures come back as a single error segment.
    #[instrument(skip(self), fields(translation = ?self.translation))]
    pub async fn fetch(&self, reference: &str) -> Vec<VerseSegment> {
        match self.try_fetch(reference).await {
            Ok(segments) => {
                info!(segments = segments.len(), "passage fetched from API");
                segments
            }
            Err(e) => {
                warn!(error = %e, "API fetch failed");
                vec![VerseSegment::error(failure_detail(&e))]
            }
        }
    }

    async fn try_fetch(&self, reference: &str) -> Result<Vec<VerseSegment>> {
        let url = self.passage_url(reference);
        debug!(%url, "requesting passage");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(DailyBreadError::Network(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DailyBreadError::Network(format!("{url}: body read failed: {e}")))?;

        parse_api_body(&body)
    }
}

/// Turn an API response body into segments.
///
/// A non-empty `verses` array yields one numbered segment per entry; otherwise
/// the `text` field becomes one unnumbered segment.
pub fn parse_api_body(body: &str) -> Result<Vec<VerseSegment>> {
    let passage: ApiPassage = serde_json::from_str(body)
        .map_err(|e| DailyBreadError::parse(format!("malformed API response: {e}")))?;

    if let Some(verses) = passage.verses.filter(|v| !v.is_empty()) {
        return Ok(verses
            .into_iter()
            .map(|v| VerseSegment::verse(verse_number(&v.verse), collapse_whitespace(&v.text)))
            .collect());
    }

    match passage.text.map(|t| collapse_whitespace(&t)) {
        Some(text) if !text.is_empty() => Ok(vec![VerseSegment::unnumbered(text)]),
        _ => Err(DailyBreadError::parse(
            "API response has neither verses nor text",
        )),
    }
}

fn verse_number(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verses_array_yields_numbered_segments() {
        let body = std::fs::read_to_string("../../../fixtures/json/bible-api-john-3-16-18.json")
            .expect("read fixture");
        let segments = parse_api_body(&body).unwrap();

        assert_eq!(segments.len(), 3);
        let numbers: Vec<_> = segments.iter().map(|s| s.number.as_deref()).collect();
        assert_eq!(numbers, vec![Some("16"), Some("17"), Some("18")]);
        assert!(segments[0].text.starts_with("For God so loved the world"));
        // Trailing newlines from the API are collapsed away.
        assert!(!segments[0].text.ends_with('\n'));
    }

    #[test]
    fn text_only_yields_single_unnumbered_segment() {
        let segments = parse_api_body(r#"{"text": "For God so loved...\n"}"#).unwrap();
        assert_eq!(segments, vec![VerseSegment::unnumbered("For God so loved...")]);
    }

    #[test]
    fn empty_verses_falls_back_to_text() {
        let segments = parse_api_body(r#"{"verses": [], "text": "Jesus wept."}"#).unwrap();
        assert_eq!(segments, vec![VerseSegment::unnumbered("Jesus wept.")]);
    }

    #[test]
    fn string_verse_numbers_accepted() {
        let segments =
            parse_api_body(r#"{"verses": [{"verse": "1", "text": "In the beginning"}]}"#).unwrap();
        assert_eq!(segments, vec![VerseSegment::verse("1", "In the beginning")]);
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(parse_api_body("<html>not json</html>").is_err());
        assert!(parse_api_body(r#"{"error": "not found"}"#).is_err());
    }

    #[test]
    fn passage_url_encodes_reference() {
        let fetcher = ApiFetcher::new("https://bible-api.com/", Some("kjv".into())).unwrap();
        let url = fetcher.passage_url("John 3:16-18");
        assert_eq!(url.as_str(), "https://bible-api.com/John%203:16-18?translation=kjv");

        let plain = ApiFetcher::new("https://bible-api.com", None).unwrap();
        assert_eq!(plain.passage_url("Psalm 23").as_str(), "https://bible-api.com/Psalm%2023");
    }

    #[tokio::test]
    async fn fetch_returns_n_segments_in_order() {
        let server = wiremock::MockServer::start().await;
        let body = std::fs::read_to_string("../../../fixtures/json/bible-api-john-3-16-18.json")
            .expect("read fixture");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path_regex(r"^/John"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = ApiFetcher::new(&server.uri(), None).unwrap();
        let segments = fetcher.fetch("John 3:16-18").await;

        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| !s.is_error));
        assert_eq!(segments[2].number.as_deref(), Some("18"));
    }

    #[tokio::test]
    async fn non_200_becomes_error_segment() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let fetcher = ApiFetcher::new(&server.uri(), None).unwrap();
        let segments = fetcher.fetch("Hezekiah 1:1").await;

        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_error);
        assert_eq!(segments[0].text, "Error: HTTP 404");
    }

    #[tokio::test]
    async fn translation_query_is_sent() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::query_param("translation", "web"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string(r#"{"text":"Jesus wept."}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = ApiFetcher::new(&server.uri(), Some("web".into())).unwrap();
        let segments = fetcher.fetch("John 11:35").await;
        assert_eq!(segments, vec![VerseSegment::unnumbered("Jesus wept.")]);
    }
}
