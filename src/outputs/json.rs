//! JSON export of a run's Q&A pairs.
//!
//! Files are grouped by local date and named after the local time the run
//! finished:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── 091502.json
//! ```

use crate::models::QaPair;
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Where a run finishing at `at` is written under `json_output_dir`.
pub fn output_path(json_output_dir: &str, at: DateTime<Local>) -> PathBuf {
    Path::new(json_output_dir)
        .join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", at.format("%H%M%S")))
}

/// Write `pairs` as a pretty-printed JSON array and return the file path.
///
/// # Arguments
///
/// * `pairs` - The run's Q&A pairs, written in order
/// * `json_output_dir` - Base directory; a dated subdirectory is created under it
///
/// # Returns
///
/// The path of the written file, as given by [`output_path`] for the current
/// local time.
///
/// # Errors
///
/// Directory creation, serialization or write failures.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, count = pairs.len()))]
pub async fn write_pairs(pairs: &[QaPair], json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(pairs)?;
    let path = output_path(json_output_dir, Local::now());

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote Q&A JSON file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_path_layout() {
        let at = Local.with_ymd_and_hms(2025, 5, 6, 9, 15, 2).unwrap();
        assert_eq!(
            output_path("/data/json", at),
            PathBuf::from("/data/json/2025-05-06/091502.json")
        );
    }

    #[tokio::test]
    async fn test_write_pairs_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();
        let pairs = vec![QaPair::new(
            "What is a writ of habeas corpus?",
            "An order to produce a detained person before the court.",
            "https://law.example/writs",
            "Constitutional Law",
        )];

        let path = write_pairs(&pairs, base).await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let back: Vec<QaPair> = serde_json::from_str(&written).unwrap();
        assert_eq!(back, pairs);
    }

    #[tokio::test]
    async fn test_write_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pairs(&[], dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "[]");
    }
}
