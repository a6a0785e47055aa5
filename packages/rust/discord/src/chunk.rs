//! Greedy, verse-preserving chunking of passage text into field-sized pieces.

use dailybread_shared::{MAX_FIELD_VALUE_CHARS, TRUNCATION_MARKER, VerseSegment, truncate_chars};

/// Default bound on a chunk, matching Discord's field value limit.
pub const DEFAULT_CHUNK_SIZE: usize = MAX_FIELD_VALUE_CHARS;

/// Emitted instead of an empty result.
pub const NO_TEXT_PLACEHOLDER: &str = "*(No text to display)*";

/// Room left for the marker when a single verse must be cut.
const TRUNCATION_RESERVE: usize = 50;

/// Pack rendered verses into chunks of at most `max_size` characters.
///
/// Verses are joined with newlines and never split, except a verse that alone
/// exceeds `max_size`, which is cut to `max_size - 50` characters plus a
/// truncation marker. When every segment is an error, each error text becomes
/// its own chunk unchanged.
pub fn chunk_segments(segments: &[VerseSegment], max_size: usize) -> Vec<String> {
    if !segments.is_empty() && segments.iter().all(|s| s.is_error) {
        return segments.iter().map(|s| s.text.clone()).collect();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let rendered = segment.render();
        let len = rendered.chars().count();
        if len == 0 {
            continue;
        }

        if len > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.push(truncate_verse(&rendered, max_size));
            continue;
        }

        if current.is_empty() {
            current = rendered;
            current_len = len;
        } else if current_len + 1 + len <= max_size {
            current.push('\n');
            current.push_str(&rendered);
            current_len += 1 + len;
        } else {
            chunks.push(std::mem::replace(&mut current, rendered));
            current_len = len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(NO_TEXT_PLACEHOLDER.to_string());
    }
    chunks
}

fn truncate_verse(rendered: &str, max_size: usize) -> String {
    let keep = max_size.saturating_sub(TRUNCATION_RESERVE);
    let cut = format!("{}{TRUNCATION_MARKER}", truncate_chars(rendered, keep));
    if cut.chars().count() > max_size {
        truncate_chars(&cut, max_size).to_string()
    } else {
        cut
    }
}
