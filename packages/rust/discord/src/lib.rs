//! Discord delivery for Daily Bread.
//!
//! This crate provides:
//! - [`chunk`]: packing verse segments into field-sized chunks
//! - [`embed`]: webhook message types and bounded assembly
//! - [`webhook`]: POSTing a message to the webhook

pub mod chunk;
pub mod embed;
pub mod webhook;

pub use chunk::{DEFAULT_CHUNK_SIZE, NO_TEXT_PLACEHOLDER, chunk_segments};
pub use embed::{
    Embed, EmbedFooter, LanguagePassage, MAX_EMBED_CHARS, MAX_FIELDS, MessageLayout,
    OVERFLOW_NOTE, WebhookMessage, build_message,
};
pub use webhook::{PublishOutcome, WebhookPublisher};
