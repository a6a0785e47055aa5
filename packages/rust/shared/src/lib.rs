//! Shared types, error model, and configuration for Daily Bread.
//!
//! This crate is the foundation depended on by all other Daily Bread crates.
//! It provides:
//! - [`DailyBreadError`]: the unified error type
//! - Domain types ([`DailyReference`], [`VerseSegment`], [`ChatField`])
//! - Configuration ([`AppConfig`], [`LanguageConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CREDENTIALS_ENV, DiscordConfig, LanguageConfig, ScheduleConfig, SourceKind,
    SourcesConfig, config_dir, config_file_path, load_config, load_config_from,
    parse_webhook_url, webhook_url,
};
pub use error::{DailyBreadError, Result};
pub use types::{
    ChatField, DailyReference, ERROR_PREFIX, MAX_FIELD_NAME_CHARS, MAX_FIELD_VALUE_CHARS,
    TRUNCATION_MARKER, VerseSegment, truncate_chars, truncate_with_marker,
};
