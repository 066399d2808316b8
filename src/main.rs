//! # mcq_harvest
//!
//! Harvests study material from the web into a local SQLite database:
//! question/answer pairs from arbitrary article and FAQ pages, multiple-choice
//! questions from paginated quiz sites, and technology news articles.
//!
//! ## Usage
//!
//! ```sh
//! mcq_harvest faq -j ./json
//! mcq_harvest mcq https://www.examveda.com/arithmetic-ability/practice-mcq-question-on-compound-interest/
//! mcq_harvest news
//! mcq_harvest stats
//! ```
//!
//! ## Architecture
//!
//! Q&A pages go through a fixed pipeline:
//! 1. **Fetching**: download the page ([`http`])
//! 2. **Extraction**: four independent strategies propose pairs ([`extract`])
//! 3. **Filtering, classification, dedup**: ([`pipeline`])
//! 4. **Storage**: insert pairs not similar to stored ones ([`storage`])
//! 5. **Output**: optionally export the run as JSON ([`outputs`])

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dom;
mod extract;
mod http;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod storage;
mod utils;

use cli::{Cli, Command};
use config::Config;
use http::Fetcher;
use models::{QaStats, StoredQaPair};
use outputs::json;
use pipeline::Pipeline;
use storage::SqliteStore;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mcq_harvest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref())?;
    let database_path = args.database.clone().unwrap_or_else(|| config.database_path.clone());

    if let Some(parent) = Path::new(&database_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let store = SqliteStore::open(&database_path, config.storage.similar_prefix_len)?;

    match args.command {
        Command::Faq {
            urls,
            json_output_dir,
        } => {
            // Early check so a long run doesn't end in an unwritable directory
            if let Some(dir) = json_output_dir.as_deref() {
                if let Err(e) = ensure_writable_dir(dir).await {
                    error!(path = %dir, error = %e, "JSON output directory is not writable");
                    return Err(e);
                }
            }

            let urls = if urls.is_empty() { config.faq_urls.clone() } else { urls };
            let pipeline = Pipeline::from_config(&config.extraction)?;
            debug!(?pipeline, "Pipeline ready");
            let fetcher = fetcher_for(&config)?;

            let (summary, pairs) =
                scrapers::faq::run(&fetcher, &store, &pipeline, &urls, config.page_delay).await?;
            println!(
                "Scraped {} page(s), skipped {}, failed {}: {} pair(s) found, {} new.",
                summary.pages_scraped,
                summary.pages_skipped,
                summary.pages_failed,
                summary.items_found,
                summary.items_saved
            );

            if let Some(dir) = json_output_dir.as_deref() {
                if let Err(e) = json::write_pairs(&pairs, dir).await {
                    error!(error = %e, "Failed to write JSON output");
                }
            }
        }
        Command::Mcq { urls } => {
            let urls = if urls.is_empty() { config.mcq.start_urls.clone() } else { urls };
            let fetcher = fetcher_for(&config)?;
            let summary =
                scrapers::mcq::run(&fetcher, &store, &urls, &config.mcq.course, config.mcq.page_delay).await?;
            println!(
                "Scraped {} page(s): {} question(s) found, {} new, {} already stored.",
                summary.pages_scraped, summary.items_found, summary.items_saved, summary.items_skipped
            );
        }
        Command::News => {
            let fetcher = fetcher_for(&config)?;
            let summary = scrapers::news::run(&fetcher, &store, &config.news).await?;
            println!(
                "Read {} listing(s): {} article(s) listed, {} already stored, {} new.",
                summary.pages_scraped, summary.items_found, summary.items_skipped, summary.items_saved
            );
        }
        Command::Search { term } => {
            let hits = store.search(&term)?;
            print_search(&term, &hits);
        }
        Command::Stats => {
            print_stats(&store.stats()?, store.mcq_count()?, store.news_count()?);
        }
        Command::Check => {
            let total = store.count()?;
            info!(path = %database_path, total, "Database check passed");
            println!("Database OK at {database_path} ({total} Q&A pair(s) stored).");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

fn fetcher_for(config: &Config) -> Result<Fetcher, Box<dyn Error>> {
    Fetcher::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_secs),
    )
}

fn print_search(term: &str, hits: &[StoredQaPair]) {
    if hits.is_empty() {
        println!("No Q&A pairs match '{term}'.");
        return;
    }
    println!("{} match(es) for '{term}':", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        println!();
        println!("{}. [{}] Q: {}", i + 1, hit.category, hit.question);
        println!("   A: {}", truncate_for_log(&hit.answer, 200));
        println!("   Source: {}", hit.source_url);
    }
}

fn print_stats(stats: &QaStats, mcq_total: i64, news_total: i64) {
    println!("Q&A pairs: {}", stats.total);
    println!("MCQs: {mcq_total}");
    println!("News articles: {news_total}");

    if !stats.by_category.is_empty() {
        println!("\nBy category:");
        for (category, n) in &stats.by_category {
            println!("  {category}: {n}");
        }
    }
    if !stats.by_source.is_empty() {
        println!("\nTop sources:");
        for (host, n) in &stats.by_source {
            println!("  {host}: {n}");
        }
    }
    if !stats.samples.is_empty() {
        println!("\nSamples:");
        for sample in &stats.samples {
            println!("  Q: {}", truncate_for_log(&sample.question, 100));
            println!("  A: {}", truncate_for_log(&sample.answer, 100));
        }
    }
}
