//! Ordered passage-container strategies.
//!
//! The passage page's markup is not stable, so the container is located by a
//! cascade of decreasingly specific selectors. Strategies are tried in order;
//! the first match wins.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// A named way of locating the passage container.
pub struct ContainerStrategy {
    /// Name logged when this strategy wins.
    pub name: &'static str,
    find: fn(&Html) -> Option<ElementRef<'_>>,
}

impl ContainerStrategy {
    pub fn find<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        (self.find)(doc)
    }
}

/// All strategies, most specific first.
pub static CONTAINER_STRATEGIES: &[ContainerStrategy] = &[
    ContainerStrategy {
        name: "passage-col",
        find: passage_col,
    },
    ContainerStrategy {
        name: "passage-content",
        find: passage_content,
    },
    ContainerStrategy {
        name: "passages",
        find: passages,
    },
    ContainerStrategy {
        name: "any-passage-class",
        find: any_passage_class,
    },
];

/// Locate the container, returning the winning strategy alongside it.
pub fn locate_container(doc: &Html) -> Option<(&'static ContainerStrategy, ElementRef<'_>)> {
    CONTAINER_STRATEGIES
        .iter()
        .find_map(|strategy| strategy.find(doc).map(|el| (strategy, el)))
}

static PASSAGE_COL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.passage-col").expect("valid selector"));
static PASSAGE_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.passage-content").expect("valid selector"));
static PASSAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.passages").expect("valid selector"));
static CLASSED_DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class]").expect("valid selector"));

fn passage_col(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&PASSAGE_COL).next()
}

fn passage_content(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&PASSAGE_CONTENT).next()
}

fn passages(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&PASSAGES).next()
}

fn any_passage_class(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&CLASSED_DIV).find(|el| {
        el.value()
            .attr("class")
            .is_some_and(|class| class.to_lowercase().contains("passage"))
    })
}

/// Class lists of the first `limit` classed divs, for diagnosing misses.
pub(crate) fn div_classes(doc: &Html, limit: usize) -> Vec<String> {
    doc.select(&CLASSED_DIV)
        .take(limit)
        .filter_map(|el| el.value().attr("class").map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(html: &str) -> Option<&'static str> {
        let doc = Html::parse_document(html);
        locate_container(&doc).map(|(s, _)| s.name)
    }

    #[test]
    fn strategies_are_ordered() {
        let names: Vec<_> = CONTAINER_STRATEGIES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["passage-col", "passage-content", "passages", "any-passage-class"]
        );
    }

    #[test]
    fn most_specific_strategy_wins() {
        let html = r#"<div class="passages"><div class="passage-col version-KOERV">x</div></div>"#;
        assert_eq!(winner(html), Some("passage-col"));
    }

    #[test]
    fn falls_through_to_later_strategies() {
        assert_eq!(
            winner(r#"<div class="passage-content passage-class-0">x</div>"#),
            Some("passage-content")
        );
        assert_eq!(winner(r#"<div class="passages">x</div>"#), Some("passages"));
        assert_eq!(
            winner(r#"<div class="wrap"><div class="Bible-Passage-Text">x</div></div>"#),
            Some("any-passage-class")
        );
    }

    #[test]
    fn no_container_found() {
        assert_eq!(winner(r#"<div class="search-results">nothing</div>"#), None);
        assert_eq!(winner("<p>plain</p>"), None);
    }

    #[test]
    fn div_classes_limited() {
        let html = r#"<div class="a"></div><div class="b"></div><div></div><div class="c"></div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(div_classes(&doc, 2), vec!["a".to_string(), "b".to_string()]);
    }
}
