//! Chat and message extraction over a [`DomNode`] tree.
//!
//! - [`ChatExtractor`] - chat title, link and joined date
//! - [`MessageExtractor`] - lazy iterator over message rows
//! - [`anchor`] - the ordered anchor lists both extractors evaluate
//!
//! A document may hold several chats (the archive table layout puts one
//! captioned `<table>` per chat). [`sections`] splits a document into
//! per-chat scopes; every extractor works on one scope at a time.

pub mod anchor;
mod chat;
mod message;

pub use anchor::{Anchor, Resolved, RowAnchors, resolve};
pub use chat::{ChatExtractor, ChatMetadata};
pub use message::{Layout, MessageExtractor};

use crate::dom::DomNode;

/// Splits `root` into chat sections.
///
/// Every `<table>` with a `<caption>` is its own section; a document without
/// captioned tables is a single section.
pub fn sections<N: DomNode>(root: &N) -> Vec<N> {
    let tables = root.find_all(|n| n.name() == "table" && !n.children_named("caption").is_empty());
    if tables.is_empty() {
        vec![root.clone()]
    } else {
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_single_section_for_desktop_export() {
        let doc = Document::parse(b"<div class=\"page_header\">A</div><div class=\"message\"></div>").unwrap();
        let root = doc.root();
        let found = sections(&root);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "html");
    }

    #[test]
    fn test_one_section_per_captioned_table() {
        let html = "<table><caption>One</caption><tr><td>1</td></tr></table>\
                    <table><tr><td>layout only</td></tr></table>\
                    <table><caption>Two</caption><tr><td>2</td></tr></table>";
        let doc = Document::parse(html.as_bytes()).unwrap();
        let found = sections(&doc.root());
        let captions: Vec<_> = found
            .iter()
            .map(|t| t.children_named("caption")[0].text())
            .collect();
        assert_eq!(captions, ["One", "Two"]);
    }
}
