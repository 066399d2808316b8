//! News listing and article scraper.
//!
//! Each configured [`NewsSource`] is scraped in two phases:
//!
//! 1. **Indexing**: read the listing page into [`ListingEntry`] values
//! 2. **Fetching**: download each article page not yet stored, clean its body
//!    and store the assembled [`NewsArticle`]
//!
//! The listing link (or, for sources that ask for it, a slug made from the
//! headline) is the key used to skip articles stored by earlier runs. Sources
//! with `fetch_article_pages: false` skip phase 2 and store the listing
//! summary as the body.

use crate::config::{NewsPatterns, NewsSource};
use crate::dom::{Document, Node, Pattern};
use crate::http::Fetcher;
use crate::models::NewsArticle;
use crate::scrapers::RunSummary;
use crate::storage::SqliteStore;
use crate::utils::slugify;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static EXTRA_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static TITLE: Lazy<Pattern> = Lazy::new(|| Pattern::parse("title").expect("valid selector"));
static META_DESCRIPTION: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse(r#"meta[name="description"]"#).expect("valid selector"));
static META_KEYWORDS: Lazy<Pattern> =
    Lazy::new(|| Pattern::parse(r#"meta[name="keywords"]"#).expect("valid selector"));

/// One story as it appears on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    /// The `href` exactly as written, or the slugified headline.
    pub slug: String,
    pub url: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub published: Option<String>,
}

/// What the article page itself contributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticlePage {
    pub body: String,
    pub author: Option<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
}

/// A [`NewsSource`] with its selectors and boilerplate regexes compiled.
#[derive(Debug)]
pub struct NewsScraper {
    source: NewsSource,
    patterns: NewsPatterns,
    boilerplate: Vec<Regex>,
    base: Url,
}

impl NewsScraper {
    /// # Errors
    ///
    /// An invalid selector, boilerplate regex or base URL.
    pub fn new(source: NewsSource) -> Result<Self, Box<dyn Error>> {
        let patterns = source.patterns()?;
        let boilerplate = source
            .boilerplate
            .iter()
            .map(|re| Regex::new(re))
            .collect::<Result<Vec<_>, _>>()?;
        let base = Url::parse(&source.base_url)?;
        Ok(Self {
            source,
            patterns,
            boilerplate,
            base,
        })
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Read every story box on a listing page. Boxes without a title link
    /// are skipped.
    pub fn parse_listing(&self, html: &str) -> Vec<ListingEntry> {
        let document = Document::parse(html);
        let p = &self.patterns;

        document
            .select(&p.item)
            .into_iter()
            .filter_map(|item| {
                let link = item.select_first(&p.title)?;
                let href = link.attr("href")?.trim().to_string();
                if href.is_empty() {
                    return None;
                }
                let url = self.base.join(&href).ok()?.to_string();
                let title = match self.source.title_attr.as_deref() {
                    Some(attr) => crate::utils::clean_text(link.attr(attr).unwrap_or_default()),
                    None => collapsed_text(link),
                };
                let slug = if self.source.slug_from_title {
                    slugify(&title)
                } else {
                    href
                };
                if slug.is_empty() {
                    return None;
                }

                let image_url = item.select_first(&p.image).and_then(|img| {
                    img.attr("data-src")
                        .filter(|s| !s.is_empty())
                        .or_else(|| img.attr("src"))
                        .map(str::to_string)
                });
                let published = item
                    .select_first(&p.time)
                    .and_then(|t| match self.source.date_attr.as_deref() {
                        Some(attr) => t.attr(attr).map(str::to_string),
                        None => Some(t.text()),
                    })
                    .map(|raw| self.normalize_date(&raw))
                    .filter(|d| !d.is_empty());

                Some(ListingEntry {
                    title,
                    slug,
                    url,
                    summary: item.select_first(&p.summary).map(collapsed_text).unwrap_or_default(),
                    image_url,
                    published,
                })
            })
            .collect()
    }

    /// Body, author and meta tags of an article page.
    pub fn parse_article(&self, html: &str) -> ArticlePage {
        let document = Document::parse(html);
        let p = &self.patterns;

        let body = document
            .select_first(&p.body)
            .map(|node| self.clean_body(&node.text_lines("\n")))
            .unwrap_or_default();
        let author = document
            .select_first(&p.author)
            .map(collapsed_text)
            .filter(|a| !a.is_empty());

        ArticlePage {
            body,
            author,
            meta_title: document.select_first(&TITLE).map(collapsed_text).unwrap_or_default(),
            meta_description: meta_content(&document, &META_DESCRIPTION),
            meta_keywords: meta_content(&document, &META_KEYWORDS),
        }
    }

    /// Strip boilerplate, then squeeze runs of whitespace.
    pub fn clean_body(&self, text: &str) -> String {
        let stripped = self
            .boilerplate
            .iter()
            .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
        EXTRA_WHITESPACE.replace_all(&stripped, " ").trim().to_string()
    }

    /// Reformat a listing date as `%Y-%m-%dT%H:%M:%S` when it matches the
    /// source's format (date-only formats give midnight). The source's
    /// `date_prefix` is stripped first. RFC 3339 values and anything
    /// unparseable pass through.
    pub fn normalize_date(&self, raw: &str) -> String {
        let collapsed = crate::utils::clean_text(raw);
        let raw = self
            .source
            .date_prefix
            .as_deref()
            .and_then(|prefix| collapsed.strip_prefix(prefix))
            .unwrap_or(&collapsed)
            .trim();
        if DateTime::parse_from_rfc3339(raw).is_ok() {
            return raw.to_string();
        }
        self.source
            .published_format
            .as_deref()
            .and_then(|fmt| {
                NaiveDateTime::parse_from_str(raw, fmt).ok().or_else(|| {
                    NaiveDate::parse_from_str(raw, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
            })
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    /// Combine a listing entry with its page. Empty bodies yield `None`.
    pub fn assemble(&self, entry: ListingEntry, page: ArticlePage) -> Option<NewsArticle> {
        if page.body.is_empty() {
            return None;
        }
        Some(NewsArticle {
            title: entry.title,
            slug: entry.slug,
            url: entry.url,
            short_description: entry.summary,
            full_description: page.body,
            author: page.author.or_else(|| self.source.author.clone()),
            category: self.source.category.clone(),
            image_url: entry.image_url,
            meta_title: page.meta_title,
            meta_description: page.meta_description,
            meta_keywords: page.meta_keywords,
            published_date: entry.published,
        })
    }

    /// Article built from the listing alone, its summary standing in for the
    /// body. Entries without a summary yield `None`.
    pub fn listing_article(&self, entry: ListingEntry) -> Option<NewsArticle> {
        let page = ArticlePage {
            body: self.clean_body(&entry.summary),
            ..ArticlePage::default()
        };
        self.assemble(entry, page)
    }

    /// Fetch and parse the listing page.
    #[instrument(level = "info", skip_all, fields(source = %self.source.name))]
    pub async fn index_articles(&self, fetcher: &Fetcher) -> Result<Vec<ListingEntry>, Box<dyn Error>> {
        let html = fetcher.fetch_html(&self.source.listing_url).await?;
        let entries = self.parse_listing(&html);
        info!(count = entries.len(), listing = %self.source.listing_url, "Indexed news articles");
        debug!(slugs = ?entries.iter().map(|e| &e.slug).collect::<Vec<_>>(), "Listing slugs");
        Ok(entries)
    }

    /// Fetch every entry's page in order, pausing between them. Failed and
    /// empty articles are logged and dropped.
    #[instrument(level = "info", skip_all, fields(source = %self.source.name))]
    pub async fn fetch_articles(&self, fetcher: &Fetcher, entries: Vec<ListingEntry>) -> Vec<NewsArticle> {
        let total = entries.len();
        let articles: Vec<NewsArticle> = stream::iter(entries.into_iter().enumerate())
            .then(|(i, entry)| async move {
                if i > 0 {
                    self.source.article_delay.wait().await;
                }
                let url = entry.url.clone();
                match fetcher.fetch_html(&url).await {
                    Ok(html) => {
                        let title = entry.title.clone();
                        let article = self.assemble(entry, self.parse_article(&html));
                        if article.is_none() {
                            warn!(%url, %title, "Article body empty; skipping");
                        }
                        article
                    }
                    Err(e) => {
                        error!(error = %e, %url, "Article fetch failed");
                        None
                    }
                }
            })
            .filter_map(|opt| std::future::ready(opt))
            .collect()
            .await;

        info!(fetched = articles.len(), total, "Fetched news article contents");
        articles
    }
}

fn collapsed_text(node: Node<'_>) -> String {
    crate::utils::clean_text(&node.text())
}

fn meta_content(document: &Document, pattern: &Pattern) -> String {
    document
        .select_first(pattern)
        .and_then(|m| m.attr("content"))
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

/// Listing entries whose slug is not stored yet. Stored ones are counted as
/// skipped items.
fn partition_stored(
    store: &SqliteStore,
    entries: Vec<ListingEntry>,
    summary: &mut RunSummary,
) -> rusqlite::Result<Vec<ListingEntry>> {
    summary.items_found += entries.len();
    let mut fresh = Vec::with_capacity(entries.len());
    for entry in entries {
        if store.news_exists(&entry.slug)? {
            debug!(slug = %entry.slug, "Already stored; skipping");
            summary.items_skipped += 1;
        } else {
            fresh.push(entry);
        }
    }
    Ok(fresh)
}

/// Scrape every source, storing articles whose slug is new.
///
/// # Errors
///
/// Storage failures and invalid source definitions. A listing page that
/// fails to load is logged and counted.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run(
    fetcher: &Fetcher,
    store: &SqliteStore,
    sources: &[NewsSource],
) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    for source in sources {
        let scraper = NewsScraper::new(source.clone())?;
        let entries = match scraper.index_articles(fetcher).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(source = scraper.name(), error = %e, "Failed to load listing page");
                summary.pages_failed += 1;
                continue;
            }
        };
        summary.pages_scraped += 1;
        let fresh = partition_stored(store, entries, &mut summary)?;

        let articles = if source.fetch_article_pages {
            scraper.fetch_articles(fetcher, fresh).await
        } else {
            fresh.into_iter().filter_map(|e| scraper.listing_article(e)).collect()
        };
        for article in articles {
            if store.insert_news(&article)? {
                info!(title = %article.title, "Inserted news article");
                summary.items_saved += 1;
            }
        }
    }

    info!(
        listings = summary.pages_scraped,
        failed = summary.pages_failed,
        found = summary.items_found,
        already_stored = summary.items_skipped,
        saved = summary.items_saved,
        "News run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::DEFAULT_SIMILAR_PREFIX_LEN;

    fn et() -> NewsScraper {
        NewsScraper::new(Config::default().news[0].clone()).unwrap()
    }

    fn toi() -> NewsScraper {
        NewsScraper::new(Config::default().news[1].clone()).unwrap()
    }

    fn business_today() -> NewsScraper {
        NewsScraper::new(Config::default().news[2].clone()).unwrap()
    }

    const BT_LISTING: &str = r#"
        <div class="Section_widget_listing_body__f9Mee">
          <a href="/tech-today/enterprise-tech/story/cloud-deal-123" title="Infosys, TCS: Cloud deals (2025)?">
            <img src="https://akm-img.example/bt.jpg">
          </a>
          <p>Both firms signed large contracts this quarter.</p>
          <span>Updated : May 06, 2025</span>
        </div>
        <div class="Section_widget_listing_body__f9Mee">
          <a href="https://www.businesstoday.in/x" title="No summary here"></a>
        </div>
    "#;

    const LISTING: &str = r#"
        <div class="story-box clearfix">
          <div class="image"><img data-src="https://img.example/a.jpg" src="placeholder.gif"></div>
          <h4><a href="/tech/it/chipmaker-expands/articleshow/1.cms">Chipmaker  expands</a></h4>
          <p>New plant in Pune.</p>
          <time datetime="2025-05-06T10:00:00+05:30">May 6</time>
        </div>
        <div class="story-box clearfix">
          <div class="image"><img src="https://img.example/b.jpg"></div>
          <h4><a href="https://other.example/story">Elsewhere</a></h4>
        </div>
        <div class="story-box clearfix"><p>No link here</p></div>
    "#;

    #[test]
    fn test_parse_listing() {
        let entries = et().parse_listing(LISTING);
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Chipmaker expands");
        assert_eq!(first.slug, "/tech/it/chipmaker-expands/articleshow/1.cms");
        assert_eq!(
            first.url,
            "https://economictimes.indiatimes.com/tech/it/chipmaker-expands/articleshow/1.cms"
        );
        assert_eq!(first.summary, "New plant in Pune.");
        assert_eq!(first.image_url.as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(first.published.as_deref(), Some("2025-05-06T10:00:00+05:30"));

        let second = &entries[1];
        assert_eq!(second.url, "https://other.example/story");
        assert_eq!(second.image_url.as_deref(), Some("https://img.example/b.jpg"));
        assert_eq!(second.summary, "");
        assert!(second.published.is_none());
    }

    #[test]
    fn test_parse_article_cleans_boilerplate() {
        let html = r#"
            <html><head>
              <title> Chipmaker expands - ETtech </title>
              <meta name="description" content=" A new plant. ">
              <meta name="keywords" content="chips,pune">
            </head><body>
              <span class="authDetail"><a>Asha Rao</a></span>
              <div class="artText contentDivWrapper">
                <p>The company said on Tuesday it will open a plant.</p>
                <p>ETtech   reported the deal first.</p>
                (Catch all the Technology News and Updates on The Economic Times.)...
              </div>
            </body></html>
        "#;
        let page = et().parse_article(html);
        assert_eq!(
            page.body,
            "The company said on Tuesday it will open a plant. reported the deal first."
        );
        assert_eq!(page.author.as_deref(), Some("Asha Rao"));
        assert_eq!(page.meta_title, "Chipmaker expands - ETtech");
        assert_eq!(page.meta_description, "A new plant.");
        assert_eq!(page.meta_keywords, "chips,pune");
    }

    #[test]
    fn test_parse_article_without_body() {
        let page = toi().parse_article("<html><body><div class=\"other\">x</div></body></html>");
        assert!(page.body.is_empty());
        assert!(page.author.is_none());
        assert_eq!(page.meta_description, "");
    }

    #[test]
    fn test_assemble_skips_empty_body() {
        let scraper = toi();
        let entry = scraper.parse_listing(LISTING).remove(0);
        assert!(scraper.assemble(entry.clone(), ArticlePage::default()).is_none());

        let page = ArticlePage {
            body: "Body text".into(),
            ..ArticlePage::default()
        };
        let article = scraper.assemble(entry, page).unwrap();
        assert_eq!(article.category, "IT");
        assert_eq!(article.full_description, "Body text");
        assert!(article.url.starts_with("https://timesofindia.indiatimes.com/"));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(toi().normalize_date("May 06, 2025, 10:15 AM IST"), "2025-05-06T10:15:00");
        assert_eq!(toi().normalize_date("2025-05-06T10:00:00Z"), "2025-05-06T10:00:00Z");
        assert_eq!(toi().normalize_date("yesterday"), "yesterday");
        assert_eq!(et().normalize_date("May 06, 2025, 10:15 AM IST"), "May 06, 2025, 10:15 AM IST");
    }

    #[test]
    fn test_invalid_source_rejected() {
        let source = NewsSource {
            base_url: "not a url".into(),
            ..NewsSource::default()
        };
        assert!(NewsScraper::new(source).is_err());

        let source = NewsSource {
            base_url: "https://n.example".into(),
            boilerplate: vec!["(".into()],
            ..NewsSource::default()
        };
        assert!(NewsScraper::new(source).is_err());
    }

    #[test]
    fn test_stored_slug_is_detected() {
        let store = SqliteStore::open_in_memory(DEFAULT_SIMILAR_PREFIX_LEN).unwrap();
        let scraper = et();
        let entry = scraper.parse_listing(LISTING).remove(0);
        let page = ArticlePage {
            body: "Body".into(),
            ..ArticlePage::default()
        };
        let article = scraper.assemble(entry.clone(), page).unwrap();
        store.insert_news(&article).unwrap();
        assert!(store.news_exists(&entry.slug).unwrap());
    }

    #[test]
    fn test_listing_with_title_attribute_and_text_date() {
        let entries = business_today().parse_listing(BT_LISTING);
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Infosys, TCS: Cloud deals (2025)?");
        assert_eq!(first.slug, "infosys-tcs-cloud-deals-2025");
        assert_eq!(
            first.url,
            "https://www.businesstoday.in/tech-today/enterprise-tech/story/cloud-deal-123"
        );
        assert_eq!(first.image_url.as_deref(), Some("https://akm-img.example/bt.jpg"));
        assert_eq!(first.summary, "Both firms signed large contracts this quarter.");
        assert_eq!(first.published.as_deref(), Some("2025-05-06T00:00:00"));
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn test_listing_article_uses_summary_and_fallback_author() {
        let scraper = business_today();
        let mut entries = scraper.parse_listing(BT_LISTING);
        let bare = entries.pop().unwrap();
        assert!(scraper.listing_article(bare).is_none());

        let article = scraper.listing_article(entries.remove(0)).unwrap();
        assert_eq!(article.full_description, "Both firms signed large contracts this quarter.");
        assert_eq!(article.short_description, article.full_description);
        assert_eq!(article.author.as_deref(), Some("Business Today"));
        assert_eq!(article.category, "Enterprise Tech");
    }

    #[test]
    fn test_page_author_wins_over_fallback() {
        let scraper = business_today();
        let entry = scraper.parse_listing(BT_LISTING).remove(0);
        let page = ArticlePage {
            body: "Body".into(),
            author: Some("Asha Rao".into()),
            ..ArticlePage::default()
        };
        assert_eq!(scraper.assemble(entry, page).unwrap().author.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_normalize_date_strips_prefix_and_accepts_date_only() {
        let bt = business_today();
        assert_eq!(bt.normalize_date("Updated : May 06, 2025"), "2025-05-06T00:00:00");
        assert_eq!(bt.normalize_date("  Updated :\n Jan 15, 2024 "), "2024-01-15T00:00:00");
        assert_eq!(bt.normalize_date("Updated : recently"), "recently");
    }

    #[test]
    fn test_partition_stored_counts_skipped_items() {
        let store = SqliteStore::open_in_memory(DEFAULT_SIMILAR_PREFIX_LEN).unwrap();
        let scraper = et();
        let entries = scraper.parse_listing(LISTING);
        let page = ArticlePage {
            body: "Body".into(),
            ..ArticlePage::default()
        };
        store
            .insert_news(&scraper.assemble(entries[0].clone(), page).unwrap())
            .unwrap();

        let mut summary = RunSummary::default();
        let fresh = partition_stored(&store, entries, &mut summary).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].url, "https://other.example/story");
        assert_eq!(summary.items_found, 2);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.pages_skipped, 0);
    }
}
