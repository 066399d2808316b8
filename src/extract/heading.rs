//! Heading-based extraction.
//!
//! Headings and bold runs that read like questions are paired with the first
//! substantial piece of text that follows them.

use super::{BOLD_TAGS, Extractor, HEADING_TAGS, QuestionVocabulary, RawPair};
use crate::dom::{Document, Node, Sibling};
use crate::utils::{char_len, clean_text};

/// Sibling elements that can hold an answer directly.
const ANSWER_TAGS: [&str; 5] = ["p", "div", "span", "li", "dd"];

/// Children of a sibling that are checked when the sibling itself is not an answer.
const NESTED_ANSWER_TAGS: [&str; 3] = ["p", "div", "span"];

/// Answers must be strictly longer than this many characters.
const MIN_ANSWER_CHARS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct HeadingExtractor {
    vocabulary: QuestionVocabulary,
}

impl HeadingExtractor {
    pub fn new(vocabulary: QuestionVocabulary) -> Self {
        Self {
            vocabulary: vocabulary.normalized(),
        }
    }
}

impl Extractor for HeadingExtractor {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn extract(&self, document: &Document, _source_url: &str) -> Vec<RawPair> {
        let candidate_tags: Vec<&str> = HEADING_TAGS.iter().chain(BOLD_TAGS.iter()).copied().collect();

        document
            .elements_named(&candidate_tags)
            .into_iter()
            .filter_map(|element| {
                let question = clean_text(&element.text());
                if !self.vocabulary.is_question(&question) {
                    return None;
                }
                let answer = answer_after(&element)?;
                Some(RawPair { question, answer })
            })
            .collect()
    }
}

fn substantial(text: &str) -> Option<String> {
    let text = clean_text(text);
    (char_len(&text) > MIN_ANSWER_CHARS).then_some(text)
}

/// Walk forward through the siblings of `question` for the first answer-like text.
fn answer_after(question: &Node<'_>) -> Option<String> {
    for sibling in question.next_siblings() {
        match sibling {
            Sibling::Text(text) => {
                if let Some(answer) = substantial(text) {
                    return Some(answer);
                }
            }
            Sibling::Element(element) => {
                if ANSWER_TAGS.contains(&element.tag()) {
                    if let Some(answer) = substantial(&element.text()) {
                        return Some(answer);
                    }
                }
                let nested = element
                    .children()
                    .into_iter()
                    .filter(|child| NESTED_ANSWER_TAGS.contains(&child.tag()))
                    .find_map(|child| substantial(&child.text()));
                if nested.is_some() {
                    return nested;
                }
            }
        }
    }
    None
}
