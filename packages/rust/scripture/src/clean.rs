//! Text cleanup passes for extracted passage text.

use std::sync::LazyLock;

use regex::Regex;

/// Footnote markers such as `[a]`, `[B]`.
static FOOTNOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[a-zA-Z]\]").expect("valid regex"));

/// Cross-reference markers such as `(A)`, `(K)`.
static CROSSREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([A-Z]\)").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip footnote/cross-reference markers, then collapse whitespace.
pub(crate) fn clean_text(raw: &str) -> String {
    let without_notes = FOOTNOTE_RE.replace_all(raw, "");
    let without_refs = CROSSREF_RE.replace_all(&without_notes, "");
    collapse_whitespace(&without_refs)
}

/// Collapse every whitespace run to one space and trim the ends.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw, " ").trim().to_string()
}

/// Keep only the digits/letters of a printed verse number (`"16\u{a0}"` → `"16"`).
pub(crate) fn clean_verse_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}
