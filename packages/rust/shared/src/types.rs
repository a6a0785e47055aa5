//! Core domain types shared by the schedule, scripture and discord crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discord's hard limit on an embed field value.
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

/// Discord's hard limit on an embed field name.
pub const MAX_FIELD_NAME_CHARS: usize = 256;

/// Appended to any text cut short to fit a length bound.
pub const TRUNCATION_MARKER: &str = "... [read the full text via the link]";

/// Prefix carried by every synthetic error segment.
pub const ERROR_PREFIX: &str = "Error: ";

// ---------------------------------------------------------------------------
// DailyReference
// ---------------------------------------------------------------------------

/// The reading scheduled for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReference {
    /// Day the reading is scheduled for.
    pub date: NaiveDate,
    /// Scripture citation, e.g. `John 3:16-18`.
    pub reference: String,
}

// ---------------------------------------------------------------------------
// VerseSegment
// ---------------------------------------------------------------------------

/// One unit of passage text in reading order.
///
/// A segment is either a numbered verse, an unnumbered run of text (API
/// fallback or scrape fallback), or a synthetic error standing in for text
/// that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseSegment {
    /// Verse number as printed by the source (`"16"`, `"3"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Cleaned verse text.
    pub text: String,
    /// Whether this segment reports a fetch failure instead of scripture.
    #[serde(default)]
    pub is_error: bool,
}

impl VerseSegment {
    /// A numbered verse.
    pub fn verse(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            text: text.into(),
            is_error: false,
        }
    }

    /// Passage text with no verse number attached.
    pub fn unnumbered(text: impl Into<String>) -> Self {
        Self {
            number: None,
            text: text.into(),
            is_error: false,
        }
    }

    /// An error segment; the text always starts with `"Error: "`.
    pub fn error(detail: impl AsRef<str>) -> Self {
        Self {
            number: None,
            text: format!("{ERROR_PREFIX}{}", detail.as_ref()),
            is_error: true,
        }
    }

    /// Display form used inside chat fields: `**16** For God so loved...`.
    pub fn render(&self) -> String {
        match &self.number {
            Some(num) => format!("**{num}** {}", self.text),
            None => self.text.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatField
// ---------------------------------------------------------------------------

/// A single embed field. Construction enforces Discord's length bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl ChatField {
    /// Build a field, truncating the name and value to Discord's limits.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_limit(name, value, MAX_FIELD_VALUE_CHARS)
    }

    /// Build a field whose value is bounded by `max_value_chars` (never above
    /// [`MAX_FIELD_VALUE_CHARS`]).
    pub fn with_limit(name: impl Into<String>, value: impl Into<String>, max_value_chars: usize) -> Self {
        let limit = max_value_chars.min(MAX_FIELD_VALUE_CHARS);
        let name = name.into();
        let value = value.into();
        Self {
            name: truncate_with_marker(&name, MAX_FIELD_NAME_CHARS, "..."),
            value: truncate_with_marker(&value, limit, TRUNCATION_MARKER),
            inline: false,
        }
    }

    /// Character count counted against the embed's total size budget.
    pub fn char_len(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Return the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Bound `text` to `max_chars` characters, ending with `marker` when cut.
///
/// The result never exceeds `max_chars`, even when the marker itself does not
/// fit.
pub fn truncate_with_marker(text: &str, max_chars: usize, marker: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let marker_len = marker.chars().count();
    if marker_len >= max_chars {
        return truncate_chars(text, max_chars).to_string();
    }
    let kept = truncate_chars(text, max_chars - marker_len).trim_end();
    format!("{kept}{marker}")
}
