//! End-to-end daily run: schedule → fetch both languages → chunk → assemble → post.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use url::Url;

use dailybread_discord::{
    LanguagePassage, MessageLayout, PublishOutcome, WebhookMessage, WebhookPublisher,
    build_message, chunk_segments,
};
use dailybread_schedule::{ReferenceSource, resolve_reference};
use dailybread_scripture::{PassageSource, passage_link};
use dailybread_shared::{
    AppConfig, DailyBreadError, DailyReference, LanguageConfig, Result, VerseSegment,
};

/// What to do with the assembled message.
pub enum Delivery<'a> {
    /// POST it to the webhook.
    Publish(&'a WebhookPublisher),
    /// Hand it back without posting.
    DryRun,
}

/// Result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing scheduled for the date.
    NoReading,
    /// Webhook accepted the message.
    Posted { reference: String, status: u16 },
    /// Webhook answered with a non-success status.
    Rejected {
        reference: String,
        status: u16,
        body: String,
    },
    /// Message assembled but not sent.
    DryRun {
        reference: String,
        message: WebhookMessage,
    },
}

impl RunOutcome {
    /// Whether the process should exit successfully.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// One language's fetcher plus the labels it is presented with.
struct Language {
    label: String,
    link_label: String,
    link_version: String,
    source: PassageSource,
}

impl Language {
    fn new(config: &LanguageConfig, app: &AppConfig) -> Result<Self> {
        Ok(Self {
            label: config.label.clone(),
            link_label: config.link_label.clone(),
            link_version: config.link_version.clone(),
            source: PassageSource::from_config(config, &app.sources)?,
        })
    }
}

/// The daily posting pipeline, built once from configuration.
pub struct DailyPost {
    english: Language,
    korean: Language,
    passage_url: String,
    layout: MessageLayout,
    chunk_size: usize,
}

impl DailyPost {
    /// Build fetchers and layout. Fails on invalid configuration, before any
    /// network activity.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let passage_url = config.sources.passage_url.clone();
        Url::parse(&passage_url).map_err(|e| {
            DailyBreadError::config(format!("invalid passage URL '{passage_url}': {e}"))
        })?;

        Ok(Self {
            english: Language::new(&config.english, config)?,
            korean: Language::new(&config.korean, config)?,
            passage_url,
            layout: MessageLayout::from(&config.discord),
            chunk_size: config.chunk_size(),
        })
    }

    /// Run once for `date`.
    ///
    /// Lookup failures abort the run. Fetch failures do not: they appear as
    /// error text in the message.
    #[instrument(skip_all, fields(%date))]
    pub async fn run<S: ReferenceSource>(
        &self,
        schedule: &S,
        date: NaiveDate,
        delivery: Delivery<'_>,
    ) -> Result<RunOutcome> {
        let start = Instant::now();

        // --- Phase 1: Reference lookup ---
        let Some(reading) = resolve_reference(schedule, date).await? else {
            info!("No reading scheduled for today.");
            return Ok(RunOutcome::NoReading);
        };

        // --- Phases 2-4: Fetch, chunk, assemble ---
        let message = self.compose(&reading).await?;
        let reference = reading.reference;

        // --- Phase 5: Deliver ---
        let outcome = match delivery {
            Delivery::DryRun => {
                info!(%reference, "dry run, message not posted");
                RunOutcome::DryRun { reference, message }
            }
            Delivery::Publish(publisher) => match publisher.publish(&reference, &message).await? {
                PublishOutcome::Delivered { status } => RunOutcome::Posted { reference, status },
                PublishOutcome::Rejected { status, body } => RunOutcome::Rejected {
                    reference,
                    status,
                    body,
                },
            },
        };

        info!(elapsed_ms = start.elapsed().as_millis() as u64, "run finished");
        Ok(outcome)
    }

    /// Fetch both languages concurrently and assemble the message.
    pub async fn compose(&self, reading: &DailyReference) -> Result<WebhookMessage> {
        let reference = reading.reference.as_str();

        let (english, korean) = tokio::join!(
            self.english.source.fetch(reference),
            self.korean.source.fetch(reference),
        );

        let languages = [
            self.passage(&self.english, reference, &english)?,
            self.passage(&self.korean, reference, &korean)?,
        ];

        Ok(build_message(&self.layout, reference, reading.date, &languages))
    }

    fn passage(
        &self,
        language: &Language,
        reference: &str,
        segments: &[VerseSegment],
    ) -> Result<LanguagePassage> {
        if segments.iter().any(|s| s.is_error) {
            warn!(language = %language.label, "passage text unavailable, posting error text");
        }
        let chunks = chunk_segments(segments, self.chunk_size);
        info!(
            language = %language.label,
            segments = segments.len(),
            chunks = chunks.len(),
            "passage chunked"
        );

        Ok(LanguagePassage {
            label: language.label.clone(),
            link_label: language.link_label.clone(),
            link: passage_link(&self.passage_url, reference, &language.link_version)?,
            chunks,
        })
    }
}
