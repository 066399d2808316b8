//! HTTP fetching for all scrapers.
//!
//! One [`Fetcher`] wraps a `reqwest::Client` configured with a browser-like
//! user agent and a per-request timeout. Non-success status codes are errors.
//! There is no retry policy: callers log a failed page and move on.

use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with the given user agent and request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Network failures, timeouts and non-2xx statuses.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// A courtesy pause between page fetches, in seconds.
///
/// When `max_secs > min_secs` the pause is drawn uniformly from the range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub fn fixed(secs: f64) -> Self {
        Self {
            min_secs: secs,
            max_secs: secs,
        }
    }

    pub fn pick(&self) -> Duration {
        let min = self.min_secs.max(0.0);
        let secs = if self.max_secs > min {
            rng().random_range(min..=self.max_secs)
        } else {
            min
        };
        Duration::from_secs_f64(secs)
    }

    pub async fn wait(&self) {
        let delay = self.pick();
        if !delay.is_zero() {
            info!(?delay, "Waiting before next request");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        assert_eq!(DelayRange::fixed(3.0).pick(), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_within_range() {
        let range = DelayRange {
            min_secs: 2.0,
            max_secs: 5.0,
        };
        for _ in 0..50 {
            let d = range.pick();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5));
        }
    }

    #[test]
    fn test_inverted_or_negative_range_clamps() {
        let range = DelayRange {
            min_secs: -1.0,
            max_secs: -3.0,
        };
        assert!(range.pick().is_zero());
    }

    #[test]
    fn test_fetcher_builds() {
        assert!(Fetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(15)).is_ok());
    }
}
