//! Keyword-table category classification.
//!
//! The first category in declaration order with any keyword appearing in the
//! lowercased URL or question wins. Nothing matching means the default label.

use serde::{Deserialize, Serialize};

/// Default label when no rule matches.
pub const DEFAULT_CATEGORY: &str = "General Law";

/// One row of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The built-in legal category table.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Contract Law",
            &["contract", "agreement", "lease", "offer", "acceptance", "consideration"],
        ),
        CategoryRule::new(
            "Constitutional Law",
            &["constitution", "fundamental", "rights", "article", "amendment"],
        ),
        CategoryRule::new(
            "Criminal Law",
            &["criminal", "penal", "offense", "crime", "arrest", "bail"],
        ),
        CategoryRule::new(
            "Civil Law",
            &["civil", "tort", "negligence", "damages", "compensation"],
        ),
        CategoryRule::new(
            "Property Law",
            &["property", "land", "real estate", "ownership", "possession"],
        ),
        CategoryRule::new(
            "Labor Law",
            &["labor", "employment", "worker", "wages", "termination"],
        ),
        CategoryRule::new(
            "Family Law",
            &["marriage", "divorce", "custody", "adoption", "maintenance"],
        ),
        CategoryRule::new(
            "Tax Law",
            &["tax", "income tax", "gst", "assessment", "deduction"],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
    default_label: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules(), DEFAULT_CATEGORY)
    }
}

impl Classifier {
    /// Keywords are lowercased here so lookups only lowercase the inputs.
    pub fn new(rules: Vec<CategoryRule>, default_label: &str) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CategoryRule {
                label: rule.label,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self {
            rules,
            default_label: default_label.to_string(),
        }
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn classify(&self, source_url: &str, question: &str) -> &str {
        let url = source_url.to_lowercase();
        let question = question.to_lowercase();
        self.rules
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|k| url.contains(k.as_str()) || question.contains(k.as_str()))
            })
            .map(|rule| rule.label.as_str())
            .unwrap_or(&self.default_label)
    }
}
