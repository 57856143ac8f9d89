//! Scraping utilities, etc.
use select::{
    document::Document,
    node::Node,
    predicate::{Predicate, Text},
};

/// Text content of `node` with runs of whitespace collapsed to one space.
#[must_use]
pub(crate) fn clean_text(node: &Node) -> String {
    collapse(&node.text())
}

pub(crate) fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First descendant of `node` matching `first`, falling back to `second`.
pub(crate) fn find_either<'a, A, B>(node: &Node<'a>, first: A, second: B) -> Option<Node<'a>>
where
    A: Predicate,
    B: Predicate,
{
    node.find(first).next().or_else(|| node.find(second).next())
}

/// Every text node of the document, trimmed and joined with single spaces.
#[must_use]
pub(crate) fn document_text(doc: &Document) -> String {
    doc.find(Text)
        .filter_map(|n| n.as_text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
