//! Verse extraction from a passage page.
//!
//! Extraction runs in two stages once the container is located:
//! 1. verse spans (`span.text` carrying a `sup.versenum` or `span.chapternum`)
//! 2. full container text, when no numbered span exists

use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use dailybread_shared::VerseSegment;

use super::strategies::{div_classes, locate_container};
use crate::clean::{clean_text, clean_verse_number};

/// Fallback text shorter than this is treated as a failed extraction.
const MIN_FALLBACK_CHARS: usize = 100;

/// Unnumbered spans at most this long are dropped when no verse precedes them.
const MIN_ORPHAN_SPAN_CHARS: usize = 3;

static TEXT_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.text").expect("valid selector"));
static VERSE_NUMBER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("sup.versenum").expect("valid selector"));
static CHAPTER_NUMBER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.chapternum").expect("valid selector"));
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

/// Elements inside a verse span whose text is not verse text.
static INLINE_SKIP: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("sup.versenum, span.chapternum, sup.footnote, sup.crossreference")
        .expect("valid selector")
});

/// Elements inside the container that are not passage text.
static FALLBACK_SKIP: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "h1, h2, h3, h4, .passage-display, .publisher-info, .publisher-info-bottom, \
         .footnotes, .crossrefs, sup.footnote, sup.crossreference, script, style",
    )
    .expect("valid selector")
});

/// How the segments were pulled out of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMethod {
    VerseSpans,
    FullText,
}

impl fmt::Display for ExtractMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VerseSpans => f.write_str("verse-spans"),
            Self::FullText => f.write_str("full-text"),
        }
    }
}

/// Result of extracting a passage page.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Segments in reading order; a single error segment on failure.
    pub segments: Vec<VerseSegment>,
    /// Container strategy that matched, if any.
    pub strategy: Option<&'static str>,
    /// Extraction stage that produced the segments, if any.
    pub method: Option<ExtractMethod>,
}

impl Extraction {
    fn failed(strategy: Option<&'static str>, detail: &str) -> Self {
        Self {
            segments: vec![VerseSegment::error(detail)],
            strategy,
            method: None,
        }
    }
}

/// Extract the passage from a full HTML page.
pub fn extract_passage(html: &str) -> Extraction {
    let doc = Html::parse_document(html);

    let Some((strategy, container)) = locate_container(&doc) else {
        debug!(div_classes = ?div_classes(&doc, 20), "no passage container found");
        return Extraction::failed(None, "No passage container found");
    };
    info!(strategy = strategy.name, "passage container located");

    let verses = extract_verse_spans(container);
    if verses.iter().any(|v| v.number.is_some()) {
        info!(verses = verses.len(), "extracted verse spans");
        return Extraction {
            segments: verses,
            strategy: Some(strategy.name),
            method: Some(ExtractMethod::VerseSpans),
        };
    }

    let text = clean_text(&text_excluding(container, &FALLBACK_SKIP, " "));
    debug!(chars = text.chars().count(), "no numbered verses, using container text");
    if text.chars().count() > MIN_FALLBACK_CHARS {
        return Extraction {
            segments: vec![VerseSegment::unnumbered(text)],
            strategy: Some(strategy.name),
            method: Some(ExtractMethod::FullText),
        };
    }

    Extraction::failed(Some(strategy.name), "Could not extract passage text")
}

/// One segment per numbered span; unnumbered spans continue the previous verse.
fn extract_verse_spans(container: ElementRef<'_>) -> Vec<VerseSegment> {
    let mut segments: Vec<VerseSegment> = Vec::new();

    for span in container.select(&TEXT_SPAN) {
        // Section headings reuse span.text for their titles
        if has_ancestor(span, container, &HEADING) {
            continue;
        }

        let number = span
            .select(&VERSE_NUMBER)
            .next()
            .map(|sup| clean_verse_number(&sup.text().collect::<String>()))
            .filter(|n| !n.is_empty())
            .or_else(|| span.select(&CHAPTER_NUMBER).next().map(|_| "1".to_string()));

        let text = clean_text(&text_excluding(span, &INLINE_SKIP, ""));
        if text.is_empty() {
            continue;
        }

        match number {
            Some(num) => segments.push(VerseSegment::verse(num, text)),
            None => {
                if let Some(previous) = segments.last_mut() {
                    previous.text.push(' ');
                    previous.text.push_str(&text);
                } else if text.chars().count() > MIN_ORPHAN_SPAN_CHARS {
                    segments.push(VerseSegment::unnumbered(text));
                }
            }
        }
    }

    segments
}

/// Whether `el` sits inside an element matching `sel`, below `root`.
fn has_ancestor(el: ElementRef<'_>, root: ElementRef<'_>, sel: &Selector) -> bool {
    el.ancestors()
        .take_while(|ancestor| ancestor.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| sel.matches(&ancestor))
}

/// Concatenate the text nodes under `root`, skipping any that sit inside an
/// element matching `skip`.
fn text_excluding(root: ElementRef<'_>, skip: &Selector, separator: &str) -> String {
    let mut out = String::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let skipped = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|el| skip.matches(&el));
        if skipped {
            continue;
        }

        if !out.is_empty() {
            out.push_str(separator);
        }
        out.push_str(text);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn extracts_numbered_verses_from_passage_page() {
        let extraction = extract_passage(&load_fixture("biblegateway-koerv-john-3.html"));

        assert_eq!(extraction.strategy, Some("passage-col"));
        assert_eq!(extraction.method, Some(ExtractMethod::VerseSpans));

        let numbers: Vec<_> = extraction
            .segments
            .iter()
            .map(|s| s.number.clone().unwrap_or_default())
            .collect();
        assert_eq!(numbers, vec!["16", "17", "18"]);

        let first = &extraction.segments[0].text;
        assert!(first.starts_with("하나님께서는 세상을 무척 사랑하셔서"));
        // Footnote and cross-reference markers are gone
        assert!(!first.contains("[a]"));
        assert!(!first.contains("(A)"));
        assert!(!first.contains("  "));
    }

    #[test]
    fn continuation_spans_join_previous_verse() {
        let extraction = extract_passage(&load_fixture("biblegateway-koerv-psalm-23.html"));

        assert_eq!(extraction.method, Some(ExtractMethod::VerseSpans));
        assert_eq!(extraction.segments.len(), 2);
        // Chapter number marks verse 1
        assert_eq!(extraction.segments[0].number.as_deref(), Some("1"));
        assert_eq!(
            extraction.segments[0].text,
            "여호와는 나의 목자이시니 내게 부족함이 없습니다."
        );
        assert_eq!(extraction.segments[1].number.as_deref(), Some("2"));
        assert!(extraction.segments[1].text.contains("쉴 만한 물가로"));
    }

    #[test]
    fn falls_back_to_container_text() {
        let extraction = extract_passage(&load_fixture("passage-no-verse-markup.html"));

        assert_eq!(extraction.strategy, Some("passage-content"));
        assert_eq!(extraction.method, Some(ExtractMethod::FullText));
        assert_eq!(extraction.segments.len(), 1);

        let seg = &extraction.segments[0];
        assert!(seg.number.is_none());
        assert!(!seg.is_error);
        assert!(seg.text.starts_with("In the beginning God created"));
        // Headings and publisher chrome are excluded
        assert!(!seg.text.contains("Genesis 1"));
        assert!(!seg.text.contains("Copyright"));
        assert!(!seg.text.contains("[a]"));
    }

    #[test]
    fn missing_container_is_single_error_segment() {
        let html = r#"<html><body><div class="search-results">No results found.</div></body></html>"#;
        let extraction = extract_passage(html);

        assert_eq!(extraction.segments.len(), 1);
        assert!(extraction.segments[0].text.starts_with("Error"));
        assert!(extraction.segments[0].is_error);
        assert!(extraction.strategy.is_none());
    }

    #[test]
    fn short_fallback_text_is_error() {
        let html = r#"<div class="passages"><p>Too short.</p></div>"#;
        let extraction = extract_passage(html);

        assert_eq!(extraction.strategy, Some("passages"));
        assert_eq!(extraction.segments.len(), 1);
        assert_eq!(
            extraction.segments[0].text,
            "Error: Could not extract passage text"
        );
    }

    #[test]
    fn orphan_spans_before_first_verse() {
        let html = r#"<div class="passage-content">
            <p><span class="text">Hi</span></p>
            <p><span class="text">A superscription line</span></p>
            <p><span class="text"><sup class="versenum">1 </sup>First verse</span></p>
        </div>"#;
        let extraction = extract_passage(html);

        let rendered: Vec<_> = extraction.segments.iter().map(|s| s.render()).collect();
        assert_eq!(rendered, vec!["A superscription line", "**1** First verse"]);
    }
}
