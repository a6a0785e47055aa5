//! Application configuration for Daily Bread.
//!
//! User config lives at `~/.dailybread/dailybread.toml` (or `--config <path>`).
//! Every value has a default, so the bot runs with no config file at all.
//! Secrets never live in the file: the webhook URL is read from the
//! environment variable named by `discord.webhook_env`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DailyBreadError, Result};
use crate::types::MAX_FIELD_VALUE_CHARS;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dailybread.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dailybread";

/// Env var that overrides `schedule.credentials_path`.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

// ---------------------------------------------------------------------------
// Config structs (matching dailybread.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the reading plan lives.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Scripture endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// First language block of the post.
    #[serde(default = "LanguageConfig::english")]
    pub english: LanguageConfig,

    /// Second language block of the post.
    #[serde(default = "LanguageConfig::korean")]
    pub korean: LanguageConfig,

    /// Webhook message settings.
    #[serde(default)]
    pub discord: DiscordConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            sources: SourcesConfig::default(),
            english: LanguageConfig::english(),
            korean: LanguageConfig::korean(),
            discord: DiscordConfig::default(),
        }
    }
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Spreadsheet title, resolved through the Drive API.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Spreadsheet ID; skips the name lookup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// Path to the service-account JSON key.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    #[serde(default = "default_sheets_api_url")]
    pub sheets_api_url: String,

    #[serde(default = "default_drive_api_url")]
    pub drive_api_url: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            spreadsheet_id: None,
            credentials_path: default_credentials_path(),
            sheets_api_url: default_sheets_api_url(),
            drive_api_url: default_drive_api_url(),
        }
    }
}

fn default_sheet_name() -> String {
    "2026_Devotional_Time_Plan".into()
}
fn default_credentials_path() -> String {
    "src/service_account.json".into()
}
fn default_sheets_api_url() -> String {
    "https://sheets.googleapis.com".into()
}
fn default_drive_api_url() -> String {
    "https://www.googleapis.com".into()
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// JSON scripture API base (`{base}/{reference}`).
    #[serde(default = "default_bible_api_url")]
    pub bible_api_url: String,

    /// HTML passage page (`?search=..&version=..`), also used for deep links.
    #[serde(default = "default_passage_url")]
    pub passage_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            bible_api_url: default_bible_api_url(),
            passage_url: default_passage_url(),
        }
    }
}

fn default_bible_api_url() -> String {
    "https://bible-api.com/".into()
}
fn default_passage_url() -> String {
    "https://www.biblegateway.com/passage/".into()
}

/// How a language's passage text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Structured JSON API.
    Api,
    /// HTML passage page.
    Scrape,
}

/// `[english]` / `[korean]` sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Field name for the passage text, e.g. `English (WEB)`.
    pub label: String,

    pub source: SourceKind,

    /// API `translation` parameter or scrape `version` code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,

    /// Version code used in the deep link to the passage page.
    pub link_version: String,

    /// Field name for the deep link.
    pub link_label: String,
}

impl LanguageConfig {
    /// World English Bible via the JSON API, linked to the ESV page.
    pub fn english() -> Self {
        Self {
            label: "English (WEB)".into(),
            source: SourceKind::Api,
            translation: None,
            link_version: "ESV".into(),
            link_label: "🇺🇸 Click here to read in ESV".into(),
        }
    }

    /// Easy Korean Bible (KOERV) scraped from the passage page.
    pub fn korean() -> Self {
        Self {
            label: "Korean (KOERV)".into(),
            source: SourceKind::Scrape,
            translation: Some("KOERV".into()),
            link_version: "KOERV".into(),
            link_label: "🇰🇷 쉬운성경 (KOERV) 보기".into(),
        }
    }
}

/// `[discord]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Display name of the webhook poster.
    #[serde(default = "default_username")]
    pub username: String,

    /// Embed accent color.
    #[serde(default = "default_color")]
    pub color: u32,

    /// Send `thread_name`, required when the webhook targets a forum channel.
    #[serde(default = "default_true")]
    pub forum_threads: bool,

    /// Name of the env var holding the webhook URL (never store the URL itself).
    #[serde(default = "default_webhook_env")]
    pub webhook_env: String,

    /// Upper bound for a passage chunk; clamped to Discord's field limit.
    #[serde(default = "default_max_field_chars")]
    pub max_field_chars: usize,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            color: default_color(),
            forum_threads: true,
            webhook_env: default_webhook_env(),
            max_field_chars: default_max_field_chars(),
        }
    }
}

fn default_username() -> String {
    "Daily DT Bot".into()
}
fn default_color() -> u32 {
    3_066_993
}
fn default_true() -> bool {
    true
}
fn default_webhook_env() -> String {
    "DISCORD_WEBHOOK_URL".into()
}
fn default_max_field_chars() -> usize {
    MAX_FIELD_VALUE_CHARS
}

impl AppConfig {
    /// Credentials path, with `GOOGLE_APPLICATION_CREDENTIALS` taking priority.
    pub fn credentials_path(&self) -> PathBuf {
        match std::env::var(CREDENTIALS_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(&self.schedule.credentials_path),
        }
    }

    /// Chunk size actually used, never above Discord's field limit.
    pub fn chunk_size(&self) -> usize {
        self.discord.max_field_chars.clamp(1, MAX_FIELD_VALUE_CHARS)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dailybread/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DailyBreadError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dailybread/dailybread.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DailyBreadError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DailyBreadError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Read the webhook URL from the environment variable named in the config.
///
/// Fails when the variable is missing, empty, or not an http(s) URL.
pub fn webhook_url(config: &AppConfig) -> Result<Url> {
    let var_name = &config.discord.webhook_env;
    let raw = match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            return Err(DailyBreadError::config(format!(
                "{var_name} environment variable is missing"
            )));
        }
    };
    parse_webhook_url(raw.trim())
}

/// Validate a webhook URL string.
pub fn parse_webhook_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DailyBreadError::config(format!("invalid webhook URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DailyBreadError::config(format!(
            "webhook URL must be http(s), got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("sheet_name"));
        assert!(toml_str.contains("DISCORD_WEBHOOK_URL"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.schedule.sheet_name, "2026_Devotional_Time_Plan");
        assert_eq!(parsed.korean.source, SourceKind::Scrape);
        assert_eq!(parsed.english.source, SourceKind::Api);
        assert_eq!(parsed.discord.color, 3_066_993);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[schedule]
spreadsheet_id = "abc123"

[korean]
label = "Korean (KRV)"
source = "scrape"
translation = "KRV"
link_version = "KRV"
link_label = "개역한글 보기"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.schedule.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(config.schedule.sheet_name, "2026_Devotional_Time_Plan");
        assert_eq!(config.korean.translation.as_deref(), Some("KRV"));
        assert_eq!(config.english.label, "English (WEB)");
        assert_eq!(config.sources.bible_api_url, "https://bible-api.com/");
    }

    #[test]
    fn chunk_size_is_clamped() {
        let mut config = AppConfig::default();
        config.discord.max_field_chars = 4000;
        assert_eq!(config.chunk_size(), MAX_FIELD_VALUE_CHARS);
        config.discord.max_field_chars = 500;
        assert_eq!(config.chunk_size(), 500);
    }

    #[test]
    fn missing_webhook_env_is_config_error() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.discord.webhook_env = "DB_TEST_NONEXISTENT_WEBHOOK_12345".into();
        let err = webhook_url(&config).unwrap_err();
        assert!(matches!(err, DailyBreadError::Config { .. }));
        assert!(err.to_string().contains("DB_TEST_NONEXISTENT_WEBHOOK_12345"));
    }

    #[test]
    fn webhook_url_validation() {
        assert!(parse_webhook_url("https://discord.com/api/webhooks/1/abc").is_ok());
        assert!(parse_webhook_url("not a url").is_err());
        assert!(parse_webhook_url("ftp://example.com/hook").is_err());
    }
}
