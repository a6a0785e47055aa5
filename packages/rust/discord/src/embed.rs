//! Webhook message types and assembly.
//!
//! Discord rejects an embed outright when any bound is exceeded, so every
//! bound is enforced here rather than assumed from the chunker's output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use dailybread_shared::{ChatField, DiscordConfig, MAX_FIELD_VALUE_CHARS, truncate_with_marker};

/// Most fields an embed may carry.
pub const MAX_FIELDS: usize = 25;

/// Most characters across title, field names/values and footer.
pub const MAX_EMBED_CHARS: usize = 6000;

const MAX_TITLE_CHARS: usize = 256;

/// Appended to the last admitted text field when chunks are dropped.
pub const OVERFLOW_NOTE: &str = "\n*(continued: read the rest via the links above)*";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// JSON body POSTed to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub username: String,
    /// Required when the webhook targets a forum channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<ChatField>,
    pub footer: EmbedFooter,
}

impl Embed {
    /// Characters counted against [`MAX_EMBED_CHARS`].
    pub fn char_len(&self) -> usize {
        self.title.chars().count()
            + self.footer.text.chars().count()
            + self.fields.iter().map(ChatField::char_len).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Presentation settings for an assembled message.
#[derive(Debug, Clone)]
pub struct MessageLayout {
    pub username: String,
    pub color: u32,
    pub forum_threads: bool,
    pub max_field_chars: usize,
}

impl From<&DiscordConfig> for MessageLayout {
    fn from(config: &DiscordConfig) -> Self {
        Self {
            username: config.username.clone(),
            color: config.color,
            forum_threads: config.forum_threads,
            max_field_chars: config.max_field_chars,
        }
    }
}

impl Default for MessageLayout {
    fn default() -> Self {
        Self::from(&DiscordConfig::default())
    }
}

/// One language's contribution to the message.
#[derive(Debug, Clone)]
pub struct LanguagePassage {
    /// Text field name, e.g. "English (WEB)".
    pub label: String,
    /// Link field name.
    pub link_label: String,
    /// Deep link to the passage page.
    pub link: Url,
    /// Chunked passage text, in reading order.
    pub chunks: Vec<String>,
}

/// Build the webhook message for one reading.
///
/// Link fields come first, then each language's chunks in order. The
/// character budget is shared evenly among languages, with any share a
/// language leaves unused passed on to the next, so a long first passage
/// cannot crowd out the second.
pub fn build_message(
    layout: &MessageLayout,
    reference: &str,
    date: NaiveDate,
    languages: &[LanguagePassage],
) -> WebhookMessage {
    let title = truncate_with_marker(&format!("🌿 Daily Bread: {reference}"), MAX_TITLE_CHARS, "...");
    let footer = EmbedFooter {
        text: format!("Posted on {}", date.format("%B %d, %Y")),
    };

    let mut fields: Vec<ChatField> = languages
        .iter()
        .take(MAX_FIELDS)
        .map(|lang| ChatField::new(&lang.link_label, format!("[Link]({})", lang.link)))
        .collect();
    let mut used = title.chars().count()
        + footer.text.chars().count()
        + fields.iter().map(ChatField::char_len).sum::<usize>();

    for (i, lang) in languages.iter().enumerate() {
        let languages_left = languages.len() - i;
        let char_share = MAX_EMBED_CHARS.saturating_sub(used) / languages_left;
        let field_share = MAX_FIELDS.saturating_sub(fields.len()) / languages_left;

        let admitted = admit_chunks(layout, lang, char_share, field_share);
        let dropped = lang.chunks.len() - admitted.len();
        if dropped > 0 {
            warn!(
                language = %lang.label,
                dropped,
                total = lang.chunks.len(),
                "message budget exceeded, dropping remaining chunks"
            );
        }

        used += admitted.iter().map(ChatField::char_len).sum::<usize>();
        fields.extend(admitted);
    }

    WebhookMessage {
        username: layout.username.clone(),
        thread_name: layout
            .forum_threads
            .then(|| format!("{} - {reference}", date.format("%m/%d"))),
        embeds: vec![Embed {
            title,
            color: layout.color,
            fields,
            footer,
        }],
    }
}

/// Turn as many of a language's chunks into fields as fit the given shares.
///
/// When any chunk is dropped, the last admitted field is rewritten to end
/// with [`OVERFLOW_NOTE`], still within its share.
fn admit_chunks(
    layout: &MessageLayout,
    lang: &LanguagePassage,
    char_share: usize,
    field_share: usize,
) -> Vec<ChatField> {
    let multipart = lang.chunks.len() > 1;
    let mut admitted: Vec<ChatField> = Vec::new();
    let mut spent = 0;

    for (i, chunk) in lang.chunks.iter().enumerate() {
        let name = if multipart {
            format!("{} - Part {}", lang.label, i + 1)
        } else {
            lang.label.clone()
        };
        let field = ChatField::with_limit(name, chunk.as_str(), layout.max_field_chars);
        if admitted.len() >= field_share || spent + field.char_len() > char_share {
            break;
        }
        spent += field.char_len();
        admitted.push(field);
    }

    if admitted.len() < lang.chunks.len() {
        if let Some(last) = admitted.last_mut() {
            let room = char_share - (spent - last.char_len()) - last.name.chars().count();
            let limit = room.min(layout.max_field_chars).min(MAX_FIELD_VALUE_CHARS);
            last.value = truncate_with_marker(&format!("{}{OVERFLOW_NOTE}", last.value), limit, OVERFLOW_NOTE);
        }
    }

    admitted
}
