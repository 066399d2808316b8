//! Text normalization, string helpers, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace/control-character normalization for extracted text
//! - String truncation for logging
//! - URL helpers for hosts and path-derived labels
//! - File system validation for output directories

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Normalize raw extracted text into a single trimmed line.
///
/// Non-whitespace control characters are dropped first, then every run of
/// whitespace (spaces, tabs, newlines) collapses to one space. Empty input
/// yields an empty string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  What\n\tis   law? "), "What is law?");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of characters (not bytes) in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` characters of `s`.
pub fn char_prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and a byte
/// count indicator appended.
///
/// # Arguments
///
/// * `s` - The string to truncate
/// * `max` - Maximum number of characters kept
///
/// # Returns
///
/// `s` unchanged when it has at most `max` characters, otherwise the first
/// `max` characters followed by `…(+N bytes)`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Host part of a URL, or `"Unknown"` when it does not parse.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Capitalize the first character of a string.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Turn a URL path segment like `arithmetic-ability` into `Arithmetic Ability`.
pub fn title_case_segment(segment: &str) -> String {
    segment
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| upcase(&w.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL slug derived from a headline.
///
/// Lowercases and trims, turns spaces into hyphens, drops punctuation
/// (`. , : ; ' " & ? ! ( ) / |`) and strips leading or trailing hyphens.
pub fn slugify(title: &str) -> String {
    const DROPPED: &[char] = &['.', ',', ':', ';', '\'', '"', '&', '?', '!', '(', ')', '/', '|'];
    title
        .trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !DROPPED.contains(c))
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a marker file.
///
/// # Arguments
///
/// * `path` - Directory to create and check
///
/// # Returns
///
/// `Ok(())` once a file could be created inside `path`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let marker = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&marker) {
        Ok(_) => {
            let _ = stdfs::remove_file(&marker);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
