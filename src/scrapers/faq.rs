//! Q&A page driver.
//!
//! For every URL not yet in the database: fetch, parse, run the
//! [`Pipeline`], save through [`QaStore::save_all`], then wait.

use crate::dom::Document;
use crate::http::{DelayRange, Fetcher};
use crate::models::QaPair;
use crate::pipeline::Pipeline;
use crate::scrapers::RunSummary;
use crate::storage::QaStore;
use std::error::Error;
use tracing::{error, info, instrument, warn};

/// Pairs extracted from one page and how many of them were new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub pairs: Vec<QaPair>,
    pub saved: usize,
}

/// Run the pipeline over an already-fetched page and store the result.
pub fn process_page<S: QaStore>(
    pipeline: &Pipeline,
    store: &S,
    html: &str,
    url: &str,
) -> rusqlite::Result<PageResult> {
    let document = Document::parse(html);
    let pairs = pipeline.run(Some(&document), url);
    let saved = if pairs.is_empty() {
        0
    } else {
        store.save_all(&pairs)?
    };
    Ok(PageResult { pairs, saved })
}

/// Scrape `urls` in order, skipping pages that already have stored pairs.
///
/// Returns the run tally and every pair the pipeline retained, whether or not
/// storage considered it new.
///
/// # Errors
///
/// Only storage failures are returned; fetch failures are logged and counted.
#[instrument(level = "info", skip_all, fields(pages = urls.len()))]
pub async fn run<S: QaStore>(
    fetcher: &Fetcher,
    store: &S,
    pipeline: &Pipeline,
    urls: &[String],
    delay: DelayRange,
) -> Result<(RunSummary, Vec<QaPair>), Box<dyn Error>> {
    let mut summary = RunSummary::default();
    let mut retained = Vec::new();

    for (i, url) in urls.iter().enumerate() {
        if store.exists(url)? {
            warn!(%url, "Already processed; skipping");
            summary.pages_skipped += 1;
            continue;
        }

        info!(index = i + 1, total = urls.len(), %url, "Scraping page");
        match fetcher.fetch_html(url).await {
            Ok(html) => {
                let page = process_page(pipeline, store, &html, url)?;
                info!(%url, found = page.pairs.len(), saved = page.saved, "Page done");
                summary.pages_scraped += 1;
                summary.items_found += page.pairs.len();
                summary.items_saved += page.saved;
                retained.extend(page.pairs);
            }
            Err(e) => {
                error!(%url, error = %e, "Failed to fetch page");
                summary.pages_failed += 1;
            }
        }

        if i + 1 < urls.len() {
            delay.wait().await;
        }
    }

    info!(
        scraped = summary.pages_scraped,
        skipped = summary.pages_skipped,
        failed = summary.pages_failed,
        found = summary.items_found,
        saved = summary.items_saved,
        "Q&A run complete"
    );
    Ok((summary, retained))
}
