//! Small DOM helpers over `scraper`/`ego_tree` shared by the page parsers.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node, Selector};

/// Text of `el` with whitespace runs collapsed to single spaces.
#[must_use]
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text chunks of `el`, trimmed, one per line, empties dropped.
#[must_use]
pub fn element_lines(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First element under `scope` matching `selector` whose collapsed text
/// satisfies `pred`.
pub fn find_by_text<'a, P>(scope: ElementRef<'a>, selector: &Selector, pred: P) -> Option<ElementRef<'a>>
where
    P: Fn(&str) -> bool,
{
    scope.select(selector).find(|el| pred(&element_text(*el)))
}

/// Trimmed text of the node right after `el`, when that node is bare text.
#[must_use]
pub fn next_text_node(el: ElementRef<'_>) -> Option<String> {
    let node = el.next_sibling()?;
    let text = node.value().as_text()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn next_element_siblings<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

#[must_use]
pub fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    next_element_siblings(el).next()
}

/// Nearest ancestor element named `tag`.
#[must_use]
pub fn ancestor_named<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}

/// Parent element of any node.
#[must_use]
pub fn parent_element<'a>(node: NodeRef<'a, Node>) -> Option<ElementRef<'a>> {
    node.parent().and_then(ElementRef::wrap)
}

/// First element after `el` in document order (descendants of `el`
/// included) that satisfies `pred`.
pub fn find_following<'a, P>(root: ElementRef<'a>, el: ElementRef<'a>, pred: P) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    root.descendants()
        .skip_while(|n| n.id() != el.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| pred(e))
}

/// Text node under `scope` whose content contains `needle`.
#[must_use]
pub fn find_text_node<'a>(scope: ElementRef<'a>, needle: &str) -> Option<NodeRef<'a, Node>> {
    scope
        .descendants()
        .find(|n| n.value().as_text().is_some_and(|t| t.contains(needle)))
}
