//! Container-based extraction.
//!
//! FAQ widgets usually wrap each question and its answer in one element
//! (`.faq-item`, `.accordion-item`, ...). Patterns are tried in priority order
//! and the first one matching anything in the document is the only one used.

use super::{BOLD_TAGS, Extractor, HEADING_TAGS, RawPair};
use crate::dom::{Document, Node, Pattern, PatternError};
use once_cell::sync::Lazy;
use tracing::debug;

/// Default container patterns, highest priority first.
pub const DEFAULT_CONTAINER_PATTERNS: [&str; 13] = [
    ".faq-item",
    ".qa-item",
    ".question-answer",
    ".faq",
    ".accordion-item",
    ".card",
    ".panel",
    r#"[class*="faq"]"#,
    r#"[class*="question"]"#,
    r#"[class*="qa"]"#,
    "div.faq > div",
    "li.faq",
    ".faq li",
];

/// Elements whose class marks them as the question inside a container.
static QUESTION_CLASS: Lazy<Pattern> = Lazy::new(|| {
    Pattern::parse(r#"[class*="question" i], [class*="title" i], [class*="heading" i]"#)
        .expect("question class pattern is valid CSS")
});

#[derive(Debug, Clone)]
pub struct ContainerExtractor {
    patterns: Vec<Pattern>,
}

impl ContainerExtractor {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Build from selector strings.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that is not valid CSS.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }
}

impl Default for ContainerExtractor {
    fn default() -> Self {
        Self::from_patterns(&DEFAULT_CONTAINER_PATTERNS).expect("default container patterns are valid CSS")
    }
}

impl Extractor for ContainerExtractor {
    fn name(&self) -> &'static str {
        "container"
    }

    fn extract(&self, document: &Document, _source_url: &str) -> Vec<RawPair> {
        for pattern in &self.patterns {
            let containers = document.select(pattern);
            if containers.is_empty() {
                continue;
            }
            debug!(%pattern, count = containers.len(), "Found Q&A containers");
            return containers.into_iter().filter_map(pair_from_container).collect();
        }
        Vec::new()
    }
}

/// Question element inside a container: first heading, else first bold
/// element, else first element with a question-ish class.
fn question_element<'a>(container: &Node<'a>) -> Option<Node<'a>> {
    container
        .first_descendant(|n| HEADING_TAGS.contains(&n.tag()))
        .or_else(|| container.first_descendant(|n| BOLD_TAGS.contains(&n.tag())))
        .or_else(|| container.first_descendant(|n| n.matches(&QUESTION_CLASS)))
}

fn pair_from_container(container: Node<'_>) -> Option<RawPair> {
    let question = question_element(&container)?;
    Some(RawPair::new(
        &question.text(),
        &container.text_without(question),
    ))
}
