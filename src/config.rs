//! Runtime configuration.
//!
//! Everything has a built-in default, so a config file is optional. A YAML
//! file passed with `--config` only needs the keys it wants to change:
//!
//! ```yaml
//! database_path: data/mcq.sqlite
//! page_delay: { min_secs: 2.0, max_secs: 5.0 }
//! faq_urls:
//!   - https://example.com/top-50-gk-questions/
//! extraction:
//!   default_category: General Knowledge
//!   categories:
//!     - label: Geography
//!       keywords: [river, mountain, capital]
//! storage:
//!   similar_prefix_len: 30
//! ```

use crate::dom::{Pattern, PatternError};
use crate::http::{DEFAULT_USER_AGENT, DelayRange};
use crate::pipeline::ExtractionConfig;
use crate::storage::DEFAULT_SIMILAR_PREFIX_LEN;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database_path: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause between Q&A pages.
    pub page_delay: DelayRange,
    /// Pages scanned by `faq` when no URLs are given on the command line.
    pub faq_urls: Vec<String>,
    pub extraction: ExtractionConfig,
    pub storage: StorageConfig,
    pub mcq: McqConfig,
    pub news: Vec<NewsSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "data/mcq.sqlite".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 15,
            page_delay: DelayRange {
                min_secs: 2.0,
                max_secs: 5.0,
            },
            faq_urls: vec![
                "https://www.jagranjosh.com/articles/ssc-cgl-exam-most-repetitive-questions-from-general-knowledge-1491297614-1".to_string(),
                "https://greendotinternationalschool.com/blog/top-50-gk-questions-with-answers-for-students/".to_string(),
            ],
            extraction: ExtractionConfig::default(),
            storage: StorageConfig::default(),
            mcq: McqConfig::default(),
            news: default_news_sources(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Leading question characters compared against stored questions.
    pub similar_prefix_len: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            similar_prefix_len: DEFAULT_SIMILAR_PREFIX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct McqConfig {
    pub start_urls: Vec<String>,
    pub course: String,
    /// Pause between listing pages.
    pub page_delay: DelayRange,
}

impl Default for McqConfig {
    fn default() -> Self {
        Self {
            start_urls: vec![
                "https://www.examveda.com/arithmetic-ability/practice-mcq-question-on-compound-interest/".to_string(),
            ],
            course: "SSC".to_string(),
            page_delay: DelayRange::fixed(3.0),
        }
    }
}

/// Selectors describing one news site's listing and article pages.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsSource {
    pub name: String,
    /// Relative links on the listing page are resolved against this.
    pub base_url: String,
    pub listing_url: String,
    pub category: String,
    pub item_selector: String,
    pub title_selector: String,
    pub summary_selector: String,
    pub image_selector: String,
    /// Attribute of the title element holding the headline. `None` reads
    /// the element's text.
    pub title_attr: Option<String>,
    /// Derive the slug from the headline instead of using the link as written.
    pub slug_from_title: bool,
    pub time_selector: String,
    /// Attribute of the time element holding the date. `None` reads the
    /// element's text.
    pub date_attr: Option<String>,
    /// Label stripped from the front of the date, such as `Updated :`.
    pub date_prefix: Option<String>,
    pub body_selector: String,
    pub author_selector: String,
    /// Author used when the article page names none.
    pub author: Option<String>,
    /// When false, the listing summary is stored as the article body and no
    /// article page is fetched.
    pub fetch_article_pages: bool,
    /// Regexes removed from the article body before whitespace is collapsed.
    pub boilerplate: Vec<String>,
    /// `strftime` format of the listing date, if known. Date-only formats
    /// are accepted.
    pub published_format: Option<String>,
    /// Pause between article pages.
    pub article_delay: DelayRange,
}

impl Default for NewsSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_url: String::new(),
            listing_url: String::new(),
            category: "IT".to_string(),
            item_selector: "div.story-box.clearfix".to_string(),
            title_selector: "h4 a".to_string(),
            summary_selector: "p".to_string(),
            image_selector: "div.image img".to_string(),
            title_attr: None,
            slug_from_title: false,
            time_selector: "time[datetime]".to_string(),
            date_attr: Some("datetime".to_string()),
            date_prefix: None,
            body_selector: "div.Normal".to_string(),
            author_selector: "span.authDetail a, div.author".to_string(),
            author: None,
            fetch_article_pages: true,
            boilerplate: Vec::new(),
            published_format: None,
            article_delay: DelayRange::fixed(1.0),
        }
    }
}

impl NewsSource {
    /// Every selector of this source, parsed.
    ///
    /// # Errors
    ///
    /// The first selector that is not valid CSS.
    pub fn patterns(&self) -> Result<NewsPatterns, PatternError> {
        Ok(NewsPatterns {
            item: Pattern::parse(&self.item_selector)?,
            title: Pattern::parse(&self.title_selector)?,
            summary: Pattern::parse(&self.summary_selector)?,
            image: Pattern::parse(&self.image_selector)?,
            time: Pattern::parse(&self.time_selector)?,
            body: Pattern::parse(&self.body_selector)?,
            author: Pattern::parse(&self.author_selector)?,
        })
    }
}

/// Parsed selectors of a [`NewsSource`].
#[derive(Debug, Clone)]
pub struct NewsPatterns {
    pub item: Pattern,
    pub title: Pattern,
    pub summary: Pattern,
    pub image: Pattern,
    pub time: Pattern,
    pub body: Pattern,
    pub author: Pattern,
}

fn default_news_sources() -> Vec<NewsSource> {
    vec![
        NewsSource {
            name: "Economic Times".to_string(),
            base_url: "https://economictimes.indiatimes.com".to_string(),
            listing_url: "https://economictimes.indiatimes.com/tech/it/articlelist/78570530.cms?from=mdr".to_string(),
            body_selector: r#"div[class*="contentDivWrapper"]"#.to_string(),
            boilerplate: vec![
                r"(?i)\(Catch all.*?Economic Times\.\).*?(\.\.\.|more)?".to_string(),
                r"(?i)\b(ETtech|AI Investments|Precedents Increasingly Regular)\b".to_string(),
            ],
            ..NewsSource::default()
        },
        NewsSource {
            name: "Times of India".to_string(),
            base_url: "https://timesofindia.indiatimes.com".to_string(),
            listing_url: "https://timesofindia.indiatimes.com/tech".to_string(),
            published_format: Some("%b %d, %Y, %I:%M %p IST".to_string()),
            ..NewsSource::default()
        },
        NewsSource {
            name: "Business Today".to_string(),
            base_url: "https://www.businesstoday.in".to_string(),
            listing_url: "https://www.businesstoday.in/tech-today/enterprise-tech".to_string(),
            category: "Enterprise Tech".to_string(),
            item_selector: "div.Section_widget_listing_body__f9Mee".to_string(),
            title_selector: "a[title]".to_string(),
            title_attr: Some("title".to_string()),
            slug_from_title: true,
            image_selector: "img".to_string(),
            time_selector: "span".to_string(),
            date_attr: None,
            date_prefix: Some("Updated :".to_string()),
            published_format: Some("%b %d, %Y".to_string()),
            author: Some("Business Today".to_string()),
            fetch_article_pages: false,
            ..NewsSource::default()
        },
    ]
}

impl Config {
    /// Load from a YAML file, or use defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Unreadable file, malformed YAML, or an invalid selector/regex anywhere
    /// in the configuration.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(Path::new(path))?;
                let config: Config = serde_yaml::from_str(&raw)?;
                info!(path, "Loaded configuration file");
                config
            }
            None => {
                info!("Using built-in configuration");
                Config::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Surface bad selectors and regexes before any page is fetched.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        for pattern in &self.extraction.container_patterns {
            Pattern::parse(pattern)?;
        }
        for source in &self.news {
            source.patterns()?;
            for re in &source.boilerplate {
                regex::Regex::new(re)?;
            }
        }
        Ok(())
    }
}
