//! Command-line interface definitions for mcq_harvest.
//!
//! Global options can also come from environment variables; everything else
//! defaults to the configuration file (or the built-in configuration).

use clap::{Parser, Subcommand};

/// Harvest question/answer pairs, MCQs and news into a local SQLite database.
///
/// # Examples
///
/// ```sh
/// # Scrape the configured Q&A pages and export the run as JSON
/// mcq_harvest faq --json-output-dir ./json
///
/// # Scrape specific pages against another database
/// mcq_harvest --database /tmp/qa.sqlite faq https://example.com/gk-questions/
///
/// # Look something up
/// mcq_harvest search "habeas corpus"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// SQLite database path (overrides the configuration)
    #[arg(long, env = "MCQ_HARVEST_DB", global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Extract Q&A pairs from article and FAQ pages
    Faq {
        /// Pages to scrape (defaults to `faq_urls` from the configuration)
        urls: Vec<String>,

        /// Also write the run's pairs to a dated JSON file under this directory
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },
    /// Scrape paginated multiple-choice quiz pages
    Mcq {
        /// Section start pages (defaults to `mcq.start_urls`)
        urls: Vec<String>,
    },
    /// Scrape the configured news listings
    News,
    /// Search stored Q&A pairs
    Search {
        term: String,
    },
    /// Show database statistics
    Stats,
    /// Verify the database can be opened and queried
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_faq_with_urls_and_output() {
        let cli = Cli::parse_from([
            "mcq_harvest",
            "faq",
            "https://a.example/1",
            "https://a.example/2",
            "--json-output-dir",
            "./json",
        ]);

        assert_eq!(
            cli.command,
            Command::Faq {
                urls: vec!["https://a.example/1".into(), "https://a.example/2".into()],
                json_output_dir: Some("./json".into()),
            }
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "mcq_harvest",
            "stats",
            "-c",
            "/tmp/config.yaml",
            "--database",
            "/tmp/qa.sqlite",
        ]);

        assert_eq!(cli.command, Command::Stats);
        assert_eq!(cli.config.as_deref(), Some("/tmp/config.yaml"));
        assert_eq!(cli.database.as_deref(), Some("/tmp/qa.sqlite"));
    }

    #[test]
    fn test_cli_search_requires_term() {
        assert!(Cli::try_parse_from(["mcq_harvest", "search"]).is_err());
        let cli = Cli::parse_from(["mcq_harvest", "search", "habeas corpus"]);
        assert_eq!(
            cli.command,
            Command::Search {
                term: "habeas corpus".into()
            }
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["mcq_harvest"]).is_err());
    }
}
