//! SQLite persistence for Q&A pairs, MCQs and news articles.
//!
//! The [`QaStore`] trait is the boundary the Q&A driver depends on. Besides
//! the in-run signature dedup done by the pipeline, storage applies its own,
//! looser check: a pair is skipped when any stored question contains the first
//! `similar_prefix_len` characters of the new one (case-insensitive). The two
//! checks are configured independently.

use crate::models::{McqQuestion, NewsArticle, QaPair, QaStats, StoredQaPair};
use crate::utils::host_of;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default number of leading question characters used by the similarity check.
pub const DEFAULT_SIMILAR_PREFIX_LEN: usize = 30;

/// What happened to a pair handed to [`QaStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    SimilarExists,
}

/// Persistence operations the Q&A driver relies on.
pub trait QaStore {
    /// Whether any pair from `source_url` is already stored.
    fn exists(&self, source_url: &str) -> rusqlite::Result<bool>;

    /// Whether a stored question contains `question_prefix` (case-insensitive).
    fn exists_similar(&self, question_prefix: &str) -> rusqlite::Result<bool>;

    /// Insert `pair` unless a similar question is already stored.
    fn insert(&self, pair: &QaPair) -> rusqlite::Result<InsertOutcome>;

    /// Insert every pair, returning how many were actually written.
    fn save_all(&self, pairs: &[QaPair]) -> rusqlite::Result<usize> {
        let mut saved = 0;
        for pair in pairs {
            if self.insert(pair)? == InsertOutcome::Inserted {
                saved += 1;
            }
        }
        Ok(saved)
    }
}

pub struct SqliteStore {
    conn: Connection,
    similar_prefix_len: usize,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .field("similar_prefix_len", &self.similar_prefix_len)
            .finish()
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path` and ensure the
    /// schema. The parent directory must already exist.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P, similar_prefix_len: usize) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self {
            conn,
            similar_prefix_len,
        };
        store.init_schema()?;
        info!("Database ready");
        Ok(store)
    }

    pub fn open_in_memory(similar_prefix_len: usize) -> rusqlite::Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            similar_prefix_len,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS questions_answers (
                id          INTEGER PRIMARY KEY,
                question    TEXT NOT NULL,
                answer      TEXT NOT NULL,
                source_url  TEXT,
                category    TEXT,
                created_at  TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_qa_source ON questions_answers(source_url);

            CREATE TABLE IF NOT EXISTS mcq_questions (
                id          INTEGER PRIMARY KEY,
                category    TEXT NOT NULL,
                subject     TEXT NOT NULL,
                course      TEXT NOT NULL,
                question    TEXT NOT NULL,
                option_a    TEXT NOT NULL,
                option_b    TEXT NOT NULL,
                option_c    TEXT NOT NULL,
                option_d    TEXT NOT NULL,
                answer      TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                UNIQUE(question, category)
            );

            CREATE TABLE IF NOT EXISTS news (
                id                INTEGER PRIMARY KEY,
                title             TEXT NOT NULL,
                slug              TEXT UNIQUE NOT NULL,
                url               TEXT NOT NULL,
                short_description TEXT,
                full_description  TEXT,
                author            TEXT,
                category          TEXT,
                image_url         TEXT,
                meta_title        TEXT,
                meta_description  TEXT,
                meta_keywords     TEXT,
                published_date    TEXT,
                updated_date      TEXT NOT NULL,
                is_published      BOOLEAN NOT NULL DEFAULT 1,
                is_active         BOOLEAN NOT NULL DEFAULT 1
            );
            ",
        )
    }

    // ── Q&A ──

    pub fn count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM questions_answers", [], |row| row.get(0))
    }

    /// Pairs whose question or answer contains `term` (case-insensitive).
    pub fn search(&self, term: &str) -> rusqlite::Result<Vec<StoredQaPair>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, question, answer, source_url, category, created_at
             FROM questions_answers
             WHERE question LIKE '%' || ?1 || '%' ESCAPE '\\'
                OR answer LIKE '%' || ?1 || '%' ESCAPE '\\'
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![escape_like(term)], stored_pair_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Totals, per-category and per-host counts, and three sample rows.
    pub fn stats(&self) -> rusqlite::Result<QaStats> {
        let total = self.count()?;

        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(category, 'Uncategorized'), COUNT(*) AS n
             FROM questions_answers GROUP BY category ORDER BY n DESC, category",
        )?;
        let by_category = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, i64)>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT source_url, COUNT(*) FROM questions_answers GROUP BY source_url",
        )?;
        let mut hosts: HashMap<String, i64> = HashMap::new();
        for row in stmt.query_map([], |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?)))? {
            let (url, n) = row?;
            let host = url.as_deref().map(host_of).unwrap_or_else(|| "Unknown".to_string());
            *hosts.entry(host).or_default() += n;
        }
        let mut by_source: Vec<(String, i64)> = hosts.into_iter().collect();
        by_source.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        by_source.truncate(5);

        let mut stmt = self.conn.prepare(
            "SELECT id, question, answer, source_url, category, created_at
             FROM questions_answers ORDER BY id LIMIT 3",
        )?;
        let samples = stmt
            .query_map([], stored_pair_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QaStats {
            total,
            by_category,
            by_source,
            samples,
        })
    }

    // ── MCQ ──

    /// Insert an MCQ; returns `false` when the same question is already stored
    /// for that category.
    pub fn insert_mcq(&self, mcq: &McqQuestion) -> rusqlite::Result<bool> {
        let [a, b, c, d] = &mcq.options;
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO mcq_questions
             (category, subject, course, question, option_a, option_b, option_c, option_d, answer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                mcq.category,
                mcq.subject,
                mcq.course,
                mcq.question,
                a,
                b,
                c,
                d,
                mcq.answer.as_str(),
                Utc::now(),
            ],
        )?;
        Ok(n > 0)
    }

    pub fn mcq_count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM mcq_questions", [], |row| row.get(0))
    }

    // ── News ──

    pub fn news_exists(&self, slug: &str) -> rusqlite::Result<bool> {
        let hit: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM news WHERE slug = ?1", params![slug], |row| row.get(0))
            .optional()?;
        Ok(hit.is_some())
    }

    /// Insert a news article; returns `false` if its slug is already stored.
    pub fn insert_news(&self, article: &NewsArticle) -> rusqlite::Result<bool> {
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO news
             (title, slug, url, short_description, full_description, author, category,
              image_url, meta_title, meta_description, meta_keywords, published_date, updated_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                article.title,
                article.slug,
                article.url,
                article.short_description,
                article.full_description,
                article.author,
                article.category,
                article.image_url,
                article.meta_title,
                article.meta_description,
                article.meta_keywords,
                article.published_date,
                Utc::now(),
            ],
        )?;
        Ok(n > 0)
    }

    pub fn news_count(&self) -> rusqlite::Result<i64> {
        self.conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))
    }
}

impl QaStore for SqliteStore {
    fn exists(&self, source_url: &str) -> rusqlite::Result<bool> {
        self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM questions_answers WHERE source_url = ?1)",
            params![source_url],
            |row| row.get(0),
        )
    }

    fn exists_similar(&self, question_prefix: &str) -> rusqlite::Result<bool> {
        self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM questions_answers
                           WHERE question LIKE '%' || ?1 || '%' ESCAPE '\\')",
            params![escape_like(question_prefix)],
            |row| row.get(0),
        )
    }

    fn insert(&self, pair: &QaPair) -> rusqlite::Result<InsertOutcome> {
        if self.exists_similar(&pair.question_prefix(self.similar_prefix_len))? {
            debug!(question = %pair.question, "Similar question already stored");
            return Ok(InsertOutcome::SimilarExists);
        }
        self.conn.execute(
            "INSERT INTO questions_answers (question, answer, source_url, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![pair.question, pair.answer, pair.source_url, pair.category, Utc::now()],
        )?;
        Ok(InsertOutcome::Inserted)
    }

    /// One transaction per batch: either every new pair lands or none does.
    fn save_all(&self, pairs: &[QaPair]) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = 0;
        for pair in pairs {
            if self.insert(pair)? == InsertOutcome::Inserted {
                saved += 1;
            }
        }
        tx.commit()?;
        info!(saved, offered = pairs.len(), "Saved Q&A pairs");
        Ok(saved)
    }
}

/// Escape `LIKE` wildcards so `term` matches literally (with `ESCAPE '\'`).
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn stored_pair_from_row(row: &Row<'_>) -> rusqlite::Result<StoredQaPair> {
    Ok(StoredQaPair {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        source_url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        category: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerKey;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory(DEFAULT_SIMILAR_PREFIX_LEN).unwrap()
    }

    fn pair(q: &str, url: &str, category: &str) -> QaPair {
        QaPair::new(q, "An answer that is comfortably long.", url, category)
    }

    #[test]
    fn test_insert_and_exists() {
        let s = store();
        assert!(!s.exists("https://a.example/faq").unwrap());
        let outcome = s
            .insert(&pair("What is the basic structure doctrine?", "https://a.example/faq", "Constitutional Law"))
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert!(s.exists("https://a.example/faq").unwrap());
        assert_eq!(s.count().unwrap(), 1);
    }

    #[test]
    fn test_similar_question_rejected_across_runs() {
        let s = store();
        s.insert(&pair("What is the basic structure doctrine of the constitution?", "https://a/1", "X"))
            .unwrap();
        // Same first 30 characters, different ending and different case.
        let outcome = s
            .insert(&pair("WHAT IS THE BASIC STRUCTURE DOCtrine in India?", "https://b/2", "X"))
            .unwrap();
        assert_eq!(outcome, InsertOutcome::SimilarExists);
        assert_eq!(s.count().unwrap(), 1);
    }

    #[test]
    fn test_similarity_is_substring_not_prefix() {
        let s = store();
        s.insert(&pair("Explain briefly: who can file a public interest litigation?", "https://a/1", "X"))
            .unwrap();
        assert!(s.exists_similar("who can file a public interest").unwrap());
    }

    #[test]
    fn test_prefix_length_is_configurable() {
        let s = SqliteStore::open_in_memory(5).unwrap();
        s.insert(&pair("Which court is the highest?", "https://a/1", "X")).unwrap();
        let outcome = s.insert(&pair("Which article defines money bills?", "https://a/2", "X")).unwrap();
        assert_eq!(outcome, InsertOutcome::SimilarExists);
    }

    #[test]
    fn test_like_wildcards_are_literal() {
        let s = store();
        s.insert(&pair("What is 100% FDI in defence sector?", "https://a/1", "X")).unwrap();
        assert!(!s.exists_similar("What is 1_0").unwrap());
        assert!(!s.exists_similar("10%0").unwrap());
        assert!(s.exists_similar("100% FDI").unwrap());
    }

    #[test]
    fn test_save_all_counts_only_new_rows() {
        let s = store();
        let pairs = vec![
            pair("Who appoints the Governor of a state?", "https://a/1", "X"),
            pair("What are the writs under Article 32?", "https://a/1", "X"),
            pair("Who appoints the Governor of a state in India?", "https://a/1", "X"),
        ];
        assert_eq!(s.save_all(&pairs).unwrap(), 2);
        assert_eq!(s.save_all(&pairs).unwrap(), 0);
        assert!(s.exists("https://a/1").unwrap());
    }

    #[test]
    fn test_search_matches_question_or_answer() {
        let s = store();
        s.insert(&QaPair::new("What is GST in India?", "A destination based consumption tax.", "https://a/1", "Tax Law"))
            .unwrap();
        s.insert(&QaPair::new("Who heads the Lok Sabha?", "The Speaker presides over it.", "https://a/2", "General Law"))
            .unwrap();
        assert_eq!(s.search("gst").unwrap().len(), 1);
        assert_eq!(s.search("SPEAKER").unwrap()[0].category, "General Law");
        assert!(s.search("nothing like this").unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let s = store();
        s.insert(&pair("Question alpha about contracts", "https://www.a.com/x", "Contract Law")).unwrap();
        s.insert(&pair("Question beta about leases here", "https://www.a.com/y", "Contract Law")).unwrap();
        s.insert(&pair("Question gamma about bail rules", "https://b.org/z", "Criminal Law")).unwrap();
        s.insert(&pair("Question delta about divorce law", "https://b.org/z", "Family Law")).unwrap();
        let stats = s.stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_category[0], ("Contract Law".to_string(), 2));
        assert_eq!(stats.by_category.len(), 3);
        assert_eq!(
            stats.by_source,
            vec![("b.org".to_string(), 2), ("www.a.com".to_string(), 2)]
        );
        assert_eq!(stats.samples.len(), 3);
        assert_eq!(stats.samples[0].question, "Question alpha about contracts");
    }

    #[test]
    fn test_mcq_insert_ignores_duplicates() {
        let s = store();
        let mcq = McqQuestion {
            category: "Compound Interest".into(),
            subject: "Arithmetic Ability".into(),
            course: "SSC".into(),
            question: "Find the CI on Rs. 1000 at 10% for 2 years.".into(),
            options: ["Rs. 200".into(), "Rs. 210".into(), "Rs. 220".into(), "Rs. 231".into()],
            answer: AnswerKey::B,
        };
        assert!(s.insert_mcq(&mcq).unwrap());
        assert!(!s.insert_mcq(&mcq).unwrap());
        assert_eq!(s.mcq_count().unwrap(), 1);
    }

    #[test]
    fn test_news_insert_and_exists() {
        let s = store();
        let article = NewsArticle {
            title: "Chipmaker expands".into(),
            slug: "/tech/chipmaker-expands/articleshow/1.cms".into(),
            url: "https://news.example/tech/chipmaker-expands/articleshow/1.cms".into(),
            short_description: "Short".into(),
            full_description: "Full body".into(),
            author: None,
            category: "IT".into(),
            image_url: None,
            meta_title: String::new(),
            meta_description: String::new(),
            meta_keywords: String::new(),
            published_date: None,
        };
        assert!(!s.news_exists(&article.slug).unwrap());
        assert!(s.insert_news(&article).unwrap());
        assert!(s.news_exists(&article.slug).unwrap());
        assert!(!s.insert_news(&article).unwrap());
        assert_eq!(s.news_count().unwrap(), 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }
}
