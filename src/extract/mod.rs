//! Candidate question/answer extractors.
//!
//! Each strategy scans a [`Document`] independently and proposes raw pairs.
//! No strategy validates what it finds; that happens downstream in
//! [`crate::pipeline`].
//!
//! | Strategy | Module | Looks at |
//! |----------|--------|----------|
//! | Container | [`container`] | FAQ/accordion widgets found by CSS pattern |
//! | Heading | [`heading`] | `h1`–`h6`, `strong`, `b` that read like questions |
//! | Definition list | [`definition_list`] | `dt`/`dd` pairs inside `dl` |
//! | Table | [`table`] | first two cells of each row |

use crate::dom::Document;
use crate::utils::{char_len, clean_text};
use serde::{Deserialize, Serialize};

pub mod container;
pub mod definition_list;
pub mod heading;
pub mod table;

pub use container::ContainerExtractor;
pub use definition_list::DefinitionListExtractor;
pub use heading::HeadingExtractor;
pub use table::TableExtractor;

/// Heading tags, in the order they are tried as question elements.
pub const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Bold-like tags that often carry a question.
pub const BOLD_TAGS: [&str; 2] = ["strong", "b"];

/// An unvalidated question/answer candidate with normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    pub question: String,
    pub answer: String,
}

impl RawPair {
    /// Build a pair, normalizing both sides.
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: clean_text(question),
            answer: clean_text(answer),
        }
    }
}

/// One heuristic for locating Q&A pairs in a document.
pub trait Extractor {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Propose candidate pairs. An empty result means "no match", never an error.
    fn extract(&self, document: &Document, source_url: &str) -> Vec<RawPair>;
}

/// Interrogative words and phrases that mark text as a question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuestionVocabulary {
    pub words: Vec<String>,
    pub phrases: Vec<String>,
}

impl Default for QuestionVocabulary {
    fn default() -> Self {
        Self {
            words: ["what", "why", "how", "when", "where", "which", "who", "whom", "whose"]
                .map(String::from)
                .to_vec(),
            phrases: ["can you", "could you", "would you", "should i", "is it", "are you"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl QuestionVocabulary {
    /// Shortest text considered a question at all.
    pub const MIN_CHARS: usize = 10;

    /// Whether already-normalized `text` reads like a question.
    ///
    /// Any one of these suffices: a trailing `?`, an interrogative word or
    /// phrase anywhere (substring match), or a leading interrogative word.
    pub fn is_question(&self, text: &str) -> bool {
        if char_len(text) < Self::MIN_CHARS {
            return false;
        }
        let lower = text.trim().to_lowercase();
        let ends_with_mark = lower.ends_with('?');
        let has_word = self.words.iter().any(|w| lower.contains(w.as_str()));
        let has_phrase = self.phrases.iter().any(|p| lower.contains(p.as_str()));
        let starts_with_word = self.words.iter().any(|w| lower.starts_with(w.as_str()));
        ends_with_mark || has_word || has_phrase || starts_with_word
    }

    /// Copy with every entry lowercased.
    pub fn normalized(&self) -> Self {
        Self {
            words: self.words.iter().map(|w| w.to_lowercase()).collect(),
            phrases: self.phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }
}
