//! Typed document tree over [`scraper::Html`].
//!
//! Extractors and page scrapers work against [`Document`], [`Node`] and
//! [`Pattern`] instead of calling `scraper` directly. Elements that never carry
//! page content (`script`, `style`, `nav`, `footer`, `header`) are treated as
//! removed: queries never return them and they contribute no text.

use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::fmt;

/// Tags whose subtrees are ignored everywhere.
pub const PRUNED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// A validated CSS selector.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    selector: Selector,
}

impl Pattern {
    /// Parse a CSS selector string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] naming the pattern if it is not valid CSS.
    pub fn parse(css: &str) -> Result<Self, PatternError> {
        let selector = Selector::parse(css).map_err(|e| PatternError {
            pattern: css.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: css.to_string(),
            selector,
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A selector string that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector `{}`: {}", self.pattern, self.message)
    }
}

impl Error for PatternError {}

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Document {
    /// Parse a full HTML document. Never fails; malformed markup is repaired
    /// the way browsers do it.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The `<html>` element.
    pub fn root(&self) -> Node<'_> {
        Node {
            el: self.html.root_element(),
        }
    }

    /// All elements matching `pattern`, in document order.
    pub fn select(&self, pattern: &Pattern) -> Vec<Node<'_>> {
        self.html
            .select(&pattern.selector)
            .filter(|el| !is_pruned(*el))
            .map(|el| Node { el })
            .collect()
    }

    /// The first element matching `pattern`.
    pub fn select_first(&self, pattern: &Pattern) -> Option<Node<'_>> {
        self.select(pattern).into_iter().next()
    }

    /// All elements with one of the given tag names, in document order.
    pub fn elements_named(&self, tags: &[&str]) -> Vec<Node<'_>> {
        let root = self.root();
        let mut found = Vec::new();
        if tags.contains(&root.tag()) {
            found.push(root);
        }
        found.extend(root.descendants_named(tags));
        found
    }
}

/// An element inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    el: ElementRef<'a>,
}

/// A node following an element at the same level.
#[derive(Debug, Clone, Copy)]
pub enum Sibling<'a> {
    Element(Node<'a>),
    Text(&'a str),
}

impl<'a> Node<'a> {
    pub fn tag(&self) -> &'a str {
        self.el.value().name()
    }

    /// Whether this element itself matches `pattern`.
    pub fn matches(&self, pattern: &Pattern) -> bool {
        pattern.selector.matches(&self.el)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.el.value().attr(name)
    }

    /// Concatenated text of every descendant text node, without separators.
    pub fn text(&self) -> String {
        let mut out = String::new();
        push_text(self.el, None, &mut out);
        out
    }

    /// Like [`Node::text`], but with the subtree rooted at `excluded` left out.
    pub fn text_without(&self, excluded: Node<'a>) -> String {
        let mut out = String::new();
        push_text(self.el, Some(excluded), &mut out);
        out
    }

    /// Text nodes joined with `separator`, each one trimmed and empty ones
    /// dropped.
    pub fn text_lines(&self, separator: &str) -> String {
        let mut runs = Vec::new();
        collect_runs(self.el, &mut runs);
        runs.iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Direct element children.
    pub fn children(&self) -> Vec<Node<'a>> {
        self.el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| !is_pruned_tag(el.value().name()))
            .map(|el| Node { el })
            .collect()
    }

    /// Descendant elements (not including `self`) with one of the given tag
    /// names, in document order.
    pub fn descendants_named(&self, tags: &[&str]) -> Vec<Node<'a>> {
        let mut found = Vec::new();
        walk_elements(self.el, &mut |el| {
            if tags.contains(&el.value().name()) {
                found.push(Node { el });
            }
            true
        });
        found
    }

    /// First descendant element (document order) satisfying `pred`.
    pub fn first_descendant<F>(&self, mut pred: F) -> Option<Node<'a>>
    where
        F: FnMut(&Node<'a>) -> bool,
    {
        let mut hit = None;
        walk_elements(self.el, &mut |el| {
            let node = Node { el };
            if pred(&node) {
                hit = Some(node);
                return false;
            }
            true
        });
        hit
    }

    /// Descendant elements matching `pattern`, in document order.
    pub fn select(&self, pattern: &Pattern) -> Vec<Node<'a>> {
        self.el
            .select(&pattern.selector)
            .filter(|el| !is_pruned(*el))
            .map(|el| Node { el })
            .collect()
    }

    pub fn select_first(&self, pattern: &Pattern) -> Option<Node<'a>> {
        self.select(pattern).into_iter().next()
    }

    /// Following siblings in order. Comments and removed elements are skipped.
    pub fn next_siblings(&self) -> Vec<Sibling<'a>> {
        self.el
            .next_siblings()
            .filter_map(|sibling| {
                if let Some(text) = sibling.value().as_text() {
                    return Some(Sibling::Text(&**text));
                }
                ElementRef::wrap(sibling)
                    .filter(|el| !is_pruned_tag(el.value().name()))
                    .map(|el| Sibling::Element(Node { el }))
            })
            .collect()
    }

    fn same_as(&self, other: &Node<'a>) -> bool {
        self.el.id() == other.el.id()
    }
}

fn is_pruned_tag(name: &str) -> bool {
    PRUNED_TAGS.contains(&name)
}

fn is_pruned(el: ElementRef<'_>) -> bool {
    is_pruned_tag(el.value().name())
        || el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| is_pruned_tag(a.value().name()))
}

/// Depth-first pre-order walk over descendant elements of `el`, skipping
/// removed subtrees. Stops as soon as `visit` returns `false`.
fn walk_elements<'a, F>(el: ElementRef<'a>, visit: &mut F) -> bool
where
    F: FnMut(ElementRef<'a>) -> bool,
{
    for child in el.children().filter_map(ElementRef::wrap) {
        if is_pruned_tag(child.value().name()) {
            continue;
        }
        if !visit(child) || !walk_elements(child, visit) {
            return false;
        }
    }
    true
}

fn push_text<'a>(el: ElementRef<'a>, excluded: Option<Node<'a>>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if is_pruned_tag(child_el.value().name()) {
                continue;
            }
            if excluded.is_some_and(|x| x.same_as(&Node { el: child_el })) {
                continue;
            }
            push_text(child_el, excluded, out);
        }
    }
}

fn collect_runs<'a>(el: ElementRef<'a>, runs: &mut Vec<&'a str>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            runs.push(&**text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !is_pruned_tag(child_el.value().name()) {
                collect_runs(child_el, runs);
            }
        }
    }
}
