//! Paginated multiple-choice quiz pages.
//!
//! A start URL such as
//! `https://www.examveda.com/arithmetic-ability/practice-mcq-question-on-compound-interest/`
//! names its subject and category in the path. Each page lists questions as
//! `article.question.single-question` blocks and links to the next page with
//! `a.nextpostslink`; the walk stops when there is no such link or a page has
//! no questions.

use crate::dom::{Document, Node, Pattern};
use crate::http::{DelayRange, Fetcher};
use crate::models::{AnswerKey, McqQuestion};
use crate::scrapers::RunSummary;
use crate::storage::SqliteStore;
use crate::utils::{clean_text, title_case_segment, truncate_for_log};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static QUESTION_BLOCK: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse("article.question.single-question").expect("valid selector"));
static QUESTION_TEXT: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse("div.question-main").expect("valid selector"));
static OPTION_ROWS: Lazy<Pattern> = Lazy::new(|| {
    Pattern::parse("div.form-inputs.clearfix.question-options > p").expect("valid selector")
});
static LABEL: Lazy<Pattern> = Lazy::new(|| Pattern::parse("label").expect("valid selector"));
static HIDDEN_ANSWER: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse(r#"input[type="hidden"]"#).expect("valid selector"));
static NEXT_PAGE: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse("a.nextpostslink").expect("valid selector"));

/// Labels attached to every question scraped from one start URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: String,
    pub subject: String,
    pub course: String,
}

/// What one listing page yielded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct McqPage {
    pub questions: Vec<McqQuestion>,
    /// Blocks missing the question text or one of the four options.
    pub incomplete: usize,
    /// Absolute URL of the following page.
    pub next_url: Option<String>,
}

/// `(category, subject)` from the first two path segments of `url`.
///
/// A single segment names the category and the subject becomes `General`.
pub fn category_subject_from_url(url: &str) -> (String, String) {
    let segments: Vec<String> = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).map(str::to_lowercase).collect())
        })
        .unwrap_or_default();

    match segments.as_slice() {
        [subject, category, ..] => (title_case_segment(category), title_case_segment(subject)),
        [category] => (title_case_segment(category), "General".to_string()),
        [] => ("General".to_string(), "General".to_string()),
    }
}

/// Parse one listing page fetched from `page_url`.
pub fn parse_page(html: &str, page_url: &str, section: &Section) -> McqPage {
    let document = Document::parse(html);
    let mut page = McqPage::default();

    for (i, block) in document.select(&QUESTION_BLOCK).into_iter().enumerate() {
        match parse_question(block, section) {
            Some(q) => page.questions.push(q),
            None => {
                warn!(index = i + 1, %page_url, "Incomplete question block; skipping");
                page.incomplete += 1;
            }
        }
    }

    page.next_url = document
        .select_first(&NEXT_PAGE)
        .and_then(|a| a.attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| Url::parse(page_url).and_then(|base| base.join(href)).ok())
        .map(|u| u.to_string());

    page
}

fn parse_question(block: Node<'_>, section: &Section) -> Option<McqQuestion> {
    let question = clean_text(&block.select_first(&QUESTION_TEXT)?.text());
    if question.is_empty() {
        return None;
    }

    let options: Vec<String> = block
        .select(&OPTION_ROWS)
        .into_iter()
        .take(4)
        .filter_map(|row| row.select(&LABEL).get(1).map(|label| clean_text(&label.text())))
        .collect();
    let options: [String; 4] = options.try_into().ok()?;

    let answer = block
        .select_first(&HIDDEN_ANSWER)
        .and_then(|input| input.attr("value"))
        .map(AnswerKey::from_hidden_value)
        .unwrap_or(AnswerKey::Unknown);

    Some(McqQuestion {
        category: section.category.clone(),
        subject: section.subject.clone(),
        course: section.course.clone(),
        question,
        options,
        answer,
    })
}

/// Walk every start URL's pages and store their questions.
///
/// # Errors
///
/// Storage failures. A page that fails to fetch ends that section's walk.
#[instrument(level = "info", skip_all, fields(sections = start_urls.len()))]
pub async fn run(
    fetcher: &Fetcher,
    store: &SqliteStore,
    start_urls: &[String],
    course: &str,
    delay: DelayRange,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    for start_url in start_urls {
        let (category, subject) = category_subject_from_url(start_url);
        let section = Section {
            category,
            subject,
            course: course.to_string(),
        };
        info!(category = %section.category, subject = %section.subject, %course, "Starting section");

        let mut visited = HashSet::new();
        let mut next = Some(start_url.clone());
        let mut page_num = 1;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!(%url, "Pagination loops back; stopping section");
                break;
            }

            info!(category = %section.category, page = page_num, %url, "Scraping MCQ page");
            let html = match fetcher.fetch_html(&url).await {
                Ok(html) => html,
                Err(e) => {
                    error!(%url, error = %e, "Failed to fetch MCQ page");
                    summary.pages_failed += 1;
                    break;
                }
            };

            let page = parse_page(&html, &url, &section);
            summary.pages_scraped += 1;
            if page.questions.is_empty() {
                warn!(%url, "No questions found; ending section");
                break;
            }

            save_questions(store, &page.questions, &mut summary)?;

            next = page.next_url;
            if next.is_some() {
                page_num += 1;
                delay.wait().await;
            }
        }
        info!(category = %section.category, pages = page_num, "Finished section");
    }

    info!(
        pages = summary.pages_scraped,
        failed = summary.pages_failed,
        found = summary.items_found,
        saved = summary.items_saved,
        already_stored = summary.items_skipped,
        "MCQ run complete"
    );
    Ok(summary)
}

/// Insert one page's questions, counting new and already stored ones.
fn save_questions(store: &SqliteStore, questions: &[McqQuestion], summary: &mut RunSummary) -> rusqlite::Result<()> {
    summary.items_found += questions.len();
    for q in questions {
        if store.insert_mcq(q)? {
            summary.items_saved += 1;
            debug!(question = %truncate_for_log(&q.question, 60), answer = q.answer.as_str(), "Inserted MCQ");
        } else {
            summary.items_skipped += 1;
            debug!(question = %truncate_for_log(&q.question, 60), "MCQ already stored");
        }
    }
    Ok(())
}
