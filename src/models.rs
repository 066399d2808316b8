//! Data models for harvested content.
//!
//! - [`QaPair`]: a question/answer pair produced by the extraction pipeline
//! - [`StoredQaPair`]: a persisted pair with its row id and capture time
//! - [`McqQuestion`]: a four-option multiple-choice question
//! - [`NewsArticle`]: a news story assembled from a listing entry and its page
//! - [`QaStats`]: aggregate figures for the `stats` command

use crate::utils::char_prefix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question/answer pair extracted from one page.
///
/// Pairs are never modified after creation; the pipeline either keeps or
/// drops them. The capture timestamp is assigned by storage on insert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
    /// The page the pair was extracted from.
    pub source_url: String,
    /// A label from the category table, or its default.
    pub category: String,
}

impl QaPair {
    pub fn new(question: &str, answer: &str, source_url: &str, category: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            source_url: source_url.to_string(),
            category: category.to_string(),
        }
    }

    /// The first `len` characters of the question, used for the looser
    /// similar-question check at insert time.
    pub fn question_prefix(&self, len: usize) -> String {
        char_prefix(&self.question, len)
    }
}

/// A row of the `questions_answers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredQaPair {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub source_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Correct option of an MCQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
    Unknown,
}

impl AnswerKey {
    /// Map the numeric value quiz pages keep in a hidden input (`"1"`..`"4"`).
    pub fn from_hidden_value(value: &str) -> Self {
        match value.trim() {
            "1" => Self::A,
            "2" => Self::B,
            "3" => Self::C,
            "4" => Self::D,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Unknown => "Unknown",
        }
    }
}

/// A four-option multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqQuestion {
    pub category: String,
    pub subject: String,
    pub course: String,
    pub question: String,
    pub options: [String; 4],
    pub answer: AnswerKey,
}

/// A news story ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    /// The link as it appears on the listing page; the natural key.
    pub slug: String,
    pub url: String,
    pub short_description: String,
    pub full_description: String,
    pub author: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub published_date: Option<String>,
}

/// Aggregate figures over the stored Q&A pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaStats {
    pub total: i64,
    /// `(category, count)`, largest first.
    pub by_category: Vec<(String, i64)>,
    /// `(host, count)`, largest first.
    pub by_source: Vec<(String, i64)>,
    pub samples: Vec<StoredQaPair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_prefix_counts_chars() {
        let pair = QaPair::new("Ŕights of an accused person", "answer", "https://x", "General Law");
        assert_eq!(pair.question_prefix(6), "Ŕights");
    }

    #[test]
    fn test_answer_key_from_hidden_value() {
        assert_eq!(AnswerKey::from_hidden_value("1"), AnswerKey::A);
        assert_eq!(AnswerKey::from_hidden_value(" 4 "), AnswerKey::D);
        assert_eq!(AnswerKey::from_hidden_value("5"), AnswerKey::Unknown);
        assert_eq!(AnswerKey::from_hidden_value(""), AnswerKey::Unknown);
        assert_eq!(AnswerKey::C.as_str(), "C");
    }

    #[test]
    fn test_qa_pair_serialization() {
        let pair = QaPair::new("What is GST?", "Goods and Services Tax.", "https://x/tax", "Tax Law");
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("\"category\":\"Tax Law\""));
        assert!(json.contains("\"source_url\":\"https://x/tax\""));
    }
}
