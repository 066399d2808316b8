//! Page drivers that feed the extraction pipeline and storage.
//!
//! Each driver fetches pages one at a time with a courtesy delay between
//! them. A page that fails to fetch is logged and skipped; only storage
//! failures abort a run.
//!
//! | Driver | Module | Input | Writes |
//! |--------|--------|-------|--------|
//! | Q&A pages | [`faq`] | Any article/FAQ page | `questions_answers` |
//! | MCQ listings | [`mcq`] | Paginated quiz pages | `mcq_questions` |
//! | News | [`news`] | Listing page + article pages (or listing only) | `news` |
//!
//! Pages never fetched because their URL is stored count as
//! `pages_skipped`; questions or articles already in the database count as
//! `items_skipped`.
//!
//! Parsing is kept in pure functions taking HTML strings so it can be tested
//! without the network.

use serde::Serialize;

pub mod faq;
pub mod mcq;
pub mod news;

/// Tally of one driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages_scraped: usize,
    /// Pages not fetched because their URL is already stored.
    pub pages_skipped: usize,
    pub pages_failed: usize,
    pub items_found: usize,
    pub items_saved: usize,
    /// Items found on a page but already present in the database.
    pub items_skipped: usize,
}
