//! Navigable document tree.
//!
//! Extractors never touch a concrete parser type. They work against
//! [`DomNode`], a small capability interface (`children`, `text`,
//! `attribute`) with tree-search helpers built on top of it. The one
//! backend shipped here is [`ScraperNode`], wrapping `scraper`'s
//! html5ever tree; [`Document`] owns the parsed tree.

mod document;

pub use document::Document;

use scraper::ElementRef;

/// Read-only view of an element in a parsed HTML tree.
///
/// Implementors provide the four primitive capabilities; every search helper
/// is derived from them, so a new backend only needs those four methods.
pub trait DomNode: Clone {
    /// Lowercase tag name (`div`, `td`, ...).
    fn name(&self) -> &str;

    /// Element children in document order (text and comment nodes are skipped).
    fn children(&self) -> Vec<Self>;

    /// Visible text of the subtree.
    ///
    /// `<br>` becomes a newline, whitespace runs within a line collapse to a
    /// single space, and the result is trimmed.
    fn text(&self) -> String;

    /// Value of attribute `name`, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Returns `true` if the `class` attribute contains `class`.
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Returns `true` if the element carries every class in `classes`.
    fn has_classes(&self, classes: &[&str]) -> bool {
        classes.iter().all(|class| self.has_class(class))
    }

    /// First descendant (pre-order, excluding `self`) satisfying `matches`.
    fn find<P>(&self, matches: P) -> Option<Self>
    where
        P: Fn(&Self) -> bool,
    {
        self.find_pruned(matches, |_| false)
    }

    /// All descendants (pre-order, excluding `self`) satisfying `matches`.
    fn find_all<P>(&self, matches: P) -> Vec<Self>
    where
        P: Fn(&Self) -> bool,
    {
        self.find_all_pruned(matches, |_| false)
    }

    /// Like [`find`](DomNode::find), but never descends into (or returns)
    /// subtrees rooted at a node satisfying `prune`.
    fn find_pruned<P, Q>(&self, matches: P, prune: Q) -> Option<Self>
    where
        P: Fn(&Self) -> bool,
        Q: Fn(&Self) -> bool,
    {
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if prune(&node) {
                continue;
            }
            if matches(&node) {
                return Some(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        None
    }

    /// Like [`find_all`](DomNode::find_all), with pruning.
    fn find_all_pruned<P, Q>(&self, matches: P, prune: Q) -> Vec<Self>
    where
        P: Fn(&Self) -> bool,
        Q: Fn(&Self) -> bool,
    {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if prune(&node) {
                continue;
            }
            let children = node.children();
            if matches(&node) {
                found.push(node);
            }
            stack.extend(children.into_iter().rev());
        }
        found
    }

    /// Direct children with tag `name`.
    fn children_named(&self, name: &str) -> Vec<Self> {
        self.children()
            .into_iter()
            .filter(|child| child.name() == name)
            .collect()
    }
}

/// [`DomNode`] backed by a `scraper` element.
#[derive(Debug, Clone, Copy)]
pub struct ScraperNode<'a>(ElementRef<'a>);

impl<'a> ScraperNode<'a> {
    /// Wraps a scraper element.
    pub fn new(element: ElementRef<'a>) -> Self {
        Self(element)
    }
}

impl DomNode for ScraperNode<'_> {
    fn name(&self) -> &str {
        self.0.value().name()
    }

    fn children(&self) -> Vec<Self> {
        self.0
            .children()
            .filter_map(ElementRef::wrap)
            .map(ScraperNode)
            .collect()
    }

    fn text(&self) -> String {
        let mut raw = String::new();
        for node in self.0.descendants() {
            if let Some(text) = node.value().as_text() {
                // source newlines are layout whitespace; only <br> breaks lines
                raw.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            } else if node.value().as_element().is_some_and(|el| el.name() == "br") {
                raw.push('\n');
            }
        }
        clean_text(&raw)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }
}

/// Collapses whitespace per line and trims surrounding blank lines.
pub(crate) fn clean_text(raw: &str) -> String {
    let lines: Vec<String> = raw
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><body>
        <div class="history">
          <div class="message default" id="message1">
            <div class="from_name">Alice</div>
            <div class="forwarded body"><div class="from_name">Carol</div></div>
            <div class="text">first line<br>  second
                line </div>
          </div>
          <div class="message default joined" id="message2">
            <div class="text">yo</div>
          </div>
        </div>
    </body></html>"#;

    #[test]
    fn test_children_skip_text_nodes() {
        let doc = Document::parse(HTML.as_bytes()).unwrap();
        let history = doc.root().find(|n| n.has_class("history")).unwrap();
        let rows = history.children();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.name() == "div"));
    }

    #[test]
    fn test_text_converts_br_and_collapses() {
        let doc = Document::parse(HTML.as_bytes()).unwrap();
        let text = doc.root().find(|n| n.has_class("text")).unwrap();
        assert_eq!(text.text(), "first line\nsecond line");
    }

    #[test]
    fn test_attribute_and_classes() {
        let doc = Document::parse(HTML.as_bytes()).unwrap();
        let row = doc.root().find(|n| n.has_class("joined")).unwrap();
        assert_eq!(row.attribute("id"), Some("message2"));
        assert!(row.has_classes(&["message", "default"]));
        assert!(!row.has_class("mess"));
        assert_eq!(row.attribute("title"), None);
    }

    #[test]
    fn test_find_all_preorder() {
        let doc = Document::parse(HTML.as_bytes()).unwrap();
        let ids: Vec<_> = doc
            .root()
            .find_all(|n| n.has_class("message"))
            .iter()
            .filter_map(|n| n.attribute("id").map(str::to_owned))
            .collect();
        assert_eq!(ids, ["message1", "message2"]);
    }

    #[test]
    fn test_find_pruned_skips_forwarded() {
        let doc = Document::parse(HTML.as_bytes()).unwrap();
        let names: Vec<_> = doc
            .root()
            .find_all_pruned(|n| n.has_class("from_name"), |n| n.has_class("forwarded"))
            .iter()
            .map(DomNode::text)
            .collect();
        assert_eq!(names, ["Alice"]);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  a \t b  "), "a b");
        assert_eq!(clean_text("\n\n a \n\n b \n"), "a\n\nb");
        assert_eq!(clean_text(" \n \n"), "");
    }
}
