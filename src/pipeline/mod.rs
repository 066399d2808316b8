//! The Q&A extraction pipeline.
//!
//! ```text
//! Document ─┬─ container ──┐
//!           ├─ heading ────┤
//!           ├─ def. list ──┼─▶ filter ─▶ classify ─▶ dedup ─▶ Vec<QaPair>
//!           └─ table ──────┘
//! ```
//!
//! Every stage absorbs its own misses: an extractor finding nothing, a pair
//! failing the filter, or no category matching are all normal outcomes.

use crate::dom::{Document, PatternError};
use crate::extract::{
    ContainerExtractor, DefinitionListExtractor, Extractor, HeadingExtractor, QuestionVocabulary,
    TableExtractor,
};
use crate::models::QaPair;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod classify;
pub mod dedup;
pub mod filter;

pub use classify::{CategoryRule, Classifier, DEFAULT_CATEGORY};
pub use dedup::{DEFAULT_SIGNATURE_LEN, deduplicate, signature};
pub use filter::is_valid_pair;

/// Tunable inputs of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Container selectors, highest priority first.
    pub container_patterns: Vec<String>,
    pub vocabulary: QuestionVocabulary,
    /// Category table; declaration order breaks ties.
    pub categories: Vec<CategoryRule>,
    pub default_category: String,
    /// Characters of the question used as the dedup signature.
    pub signature_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            container_patterns: crate::extract::container::DEFAULT_CONTAINER_PATTERNS
                .map(String::from)
                .to_vec(),
            vocabulary: QuestionVocabulary::default(),
            categories: classify::default_rules(),
            default_category: DEFAULT_CATEGORY.to_string(),
            signature_len: DEFAULT_SIGNATURE_LEN,
        }
    }
}

pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
    classifier: Classifier,
    signature_len: usize,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field(
                "extractors",
                &self.extractors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("classifier", &self.classifier)
            .field("signature_len", &self.signature_len)
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        extractors: Vec<Box<dyn Extractor>>,
        classifier: Classifier,
        signature_len: usize,
    ) -> Self {
        Self {
            extractors,
            classifier,
            signature_len,
        }
    }

    /// All four strategies in their canonical order.
    ///
    /// # Errors
    ///
    /// Fails if a container pattern is not valid CSS.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, PatternError> {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(ContainerExtractor::from_patterns(&config.container_patterns)?),
            Box::new(HeadingExtractor::new(config.vocabulary.clone())),
            Box::new(DefinitionListExtractor),
            Box::new(TableExtractor),
        ];
        Ok(Self::new(
            extractors,
            Classifier::new(config.categories.clone(), &config.default_category),
            config.signature_len,
        ))
    }

    /// Extract, filter, classify and deduplicate the pairs on one page.
    ///
    /// A missing document yields no pairs.
    pub fn run(&self, document: Option<&Document>, source_url: &str) -> Vec<QaPair> {
        let Some(document) = document else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for extractor in &self.extractors {
            let found = extractor.extract(document, source_url);
            if !found.is_empty() {
                info!(strategy = extractor.name(), count = found.len(), "Strategy found Q&A candidates");
            }
            candidates.extend(found);
        }
        let candidate_count = candidates.len();

        let valid: Vec<QaPair> = candidates
            .into_iter()
            .filter(|c| {
                let ok = is_valid_pair(&c.question, &c.answer);
                if !ok {
                    debug!(question = %truncate_for_log(&c.question, 60), "Dropped invalid candidate");
                }
                ok
            })
            .map(|c| {
                let category = self.classifier.classify(source_url, &c.question).to_string();
                QaPair {
                    question: c.question,
                    answer: c.answer,
                    source_url: source_url.to_string(),
                    category,
                }
            })
            .collect();
        let valid_count = valid.len();

        let unique = deduplicate(valid, self.signature_len);
        let uncategorized = unique
            .iter()
            .filter(|p| p.category == self.classifier.default_label())
            .count();
        info!(
            %source_url,
            candidates = candidate_count,
            valid = valid_count,
            unique = unique.len(),
            uncategorized,
            "Extraction pipeline finished"
        );
        unique
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            vec![
                Box::new(ContainerExtractor::default()),
                Box::new(HeadingExtractor::default()),
                Box::new(DefinitionListExtractor),
                Box::new(TableExtractor),
            ],
            Classifier::default(),
            DEFAULT_SIGNATURE_LEN,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/quiz";

    fn run(html: &str) -> Vec<QaPair> {
        Pipeline::default().run(Some(&Document::parse(html)), URL)
    }

    #[test]
    fn test_single_definition_list_pair_gets_default_category() {
        let pairs = run(
            "<dl><dt>We need ten chars</dt><dd>This answer text is at least twenty characters long.</dd></dl>",
        );
        assert_eq!(
            pairs,
            vec![QaPair::new(
                "We need ten chars",
                "This answer text is at least twenty characters long.",
                URL,
                "General Law",
            )]
        );
    }

    #[test]
    fn test_short_table_answer_filtered_out() {
        let doc = Document::parse("<table><tr><td>What is X?</td><td>Short</td></tr></table>");
        assert_eq!(TableExtractor.extract(&doc, URL).len(), 1);
        assert!(Pipeline::default().run(Some(&doc), URL).is_empty());
    }

    #[test]
    fn test_heading_duplicates_collapse_on_signature() {
        let prefix = "Which of the following statements about the Indian";
        assert_eq!(prefix.chars().count(), 50);
        let html = format!(
            "<h3>{prefix} Parliament is correct?</h3><p>The Rajya Sabha is a permanent house.</p>\
             <h3>{} PARLIAMENT IS WRONG?</h3><p>The Lok Sabha can be dissolved early.</p>",
            prefix.to_uppercase()
        );
        let pairs = run(&html);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "The Rajya Sabha is a permanent house.");
    }

    #[test]
    fn test_strategies_concatenate_in_order_and_dedupe_across() {
        let html = r#"
            <div class="faq-item"><h3>What is the doctrine of consideration?</h3>
              <p>Something of value must pass between the parties.</p></div>
            <dl><dt>Define negligence in tort law</dt><dd>Breach of a duty of care causing damage.</dd></dl>
            <table><tr><td>Who appoints the Chief Justice?</td><td>The President of India appoints the CJI.</td></tr></table>
        "#;
        let pairs = run(html);
        let questions: Vec<_> = pairs.iter().map(|p| p.question.as_str()).collect();
        // The faq heading is also seen by the heading strategy; dedup keeps one.
        assert_eq!(
            questions,
            vec![
                "What is the doctrine of consideration?",
                "Define negligence in tort law",
                "Who appoints the Chief Justice?",
            ]
        );
        assert_eq!(pairs[0].category, "Contract Law");
        assert_eq!(pairs[1].category, "Civil Law");
        assert_eq!(pairs[2].category, "General Law");
    }

    #[test]
    fn test_missing_or_empty_document() {
        let pipeline = Pipeline::default();
        assert!(pipeline.run(None, URL).is_empty());
        assert!(pipeline.run(Some(&Document::parse("")), URL).is_empty());
    }

    #[test]
    fn test_from_config_uses_custom_tables() {
        let config = ExtractionConfig {
            categories: vec![CategoryRule::new("Geography", &["river"])],
            default_category: "General Knowledge".to_string(),
            ..ExtractionConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let pairs = pipeline.run(
            Some(&Document::parse(
                "<dl><dt>Longest river in Asia</dt><dd>The Yangtze, at about 6300 km.</dd>\
                 <dt>Tallest peak on Earth</dt><dd>Mount Everest, at 8849 metres.</dd></dl>",
            )),
            URL,
        );
        assert_eq!(pairs[0].category, "Geography");
        assert_eq!(pairs[1].category, "General Knowledge");
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = ExtractionConfig {
            container_patterns: vec!["div[".to_string()],
            ..ExtractionConfig::default()
        };
        assert!(Pipeline::from_config(&config).is_err());
    }
}
