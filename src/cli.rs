//! Command-line interface definitions for New Words.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Feed and store settings can come from a YAML file (`--config`), from
//! environment variables, or from flags; flags and variables win.

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::DayKey;
use crate::outputs::report::DEFAULT_TOP_WORDS;
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the New Words application.
///
/// # Examples
///
/// ```sh
/// # Count yesterday's articles (the scheduled job)
/// new_words process
///
/// # Count a specific day, keeping a JSON report
/// new_words --json-output-dir ./reports process 2025-10-20
///
/// # Inspect and reset the counters
/// new_words stats --limit 25
/// new_words clear
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Also write each report as JSON into this directory
    #[arg(short, long, global = true)]
    pub json_output_dir: Option<String>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Count the words of one day's articles (defaults to yesterday)
    Process {
        /// Day to process, as YYYY-MM-DD
        #[arg(value_parser = parse_day)]
        date: Option<DayKey>,
    },
    /// Count every article in the live feed, grouped by day
    Analyze,
    /// Show the number of distinct words and the most frequent ones
    Stats {
        #[arg(short, long, default_value_t = DEFAULT_TOP_WORDS)]
        limit: usize,
    },
    /// Show the current count of specific words
    Count {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Delete all word counts
    Clear,
}

/// Settings that override the config file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// RSS feed URL
    #[arg(long, env = "FEED_URL", global = true)]
    pub feed_url: Option<String>,

    /// Paginated search endpoint used when the feed has nothing for a day
    #[arg(long, env = "SEARCH_URL", global = true)]
    pub search_url: Option<String>,

    /// User-Agent header for all requests
    #[arg(long, env = "FEED_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "FEED_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Search locale (e.g. `ru`, `en`)
    #[arg(long, env = "SEARCH_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Search ordering mode
    #[arg(long, env = "SEARCH_CHRONO", global = true)]
    pub chrono: Option<String>,

    /// Search results per page
    #[arg(long, env = "SEARCH_PER_PAGE", global = true)]
    pub per_page: Option<u32>,

    /// Word store: a `sqlite://` URL, or `memory`
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

fn parse_day(s: &str) -> std::result::Result<DayKey, String> {
    s.parse::<DayKey>().map_err(|e| e.to_string())
}

impl Cli {
    /// Load the config file (if any) and apply flag/env overrides on top.
    pub async fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref()).await?;
        self.overrides.apply(&mut config);
        Ok(config)
    }
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        let feed = &mut config.feed;
        if let Some(v) = &self.feed_url {
            feed.feed_url = v.clone();
        }
        if let Some(v) = &self.search_url {
            feed.search_url = v.clone();
        }
        if let Some(v) = &self.user_agent {
            feed.user_agent = v.clone();
        }
        if let Some(v) = self.timeout_secs {
            feed.timeout_secs = v;
        }
        if let Some(v) = &self.locale {
            feed.locale = v.clone();
        }
        if let Some(v) = &self.chrono {
            feed.chrono = v.clone();
        }
        if let Some(v) = self.per_page {
            feed.per_page = v.max(1);
        }
        if let Some(v) = &self.database_url {
            config.store.database_url = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_with_date() {
        let cli = Cli::parse_from(["new_words", "process", "2025-10-20"]);
        assert_eq!(
            cli.command,
            Command::Process {
                date: Some("2025-10-20".parse().unwrap())
            }
        );
    }

    #[test]
    fn test_process_without_date() {
        let cli = Cli::parse_from(["new_words", "process"]);
        assert_eq!(cli.command, Command::Process { date: None });
    }

    #[test]
    fn test_malformed_date_is_usage_error() {
        for bad in ["20-10-2025", "2025-10-32", "yesterday"] {
            let err = Cli::try_parse_from(["new_words", "process", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_stats_default_limit() {
        let cli = Cli::parse_from(["new_words", "stats"]);
        assert_eq!(cli.command, Command::Stats { limit: 10 });
        let cli = Cli::parse_from(["new_words", "stats", "-l", "3"]);
        assert_eq!(cli.command, Command::Stats { limit: 3 });
    }

    #[test]
    fn test_count_requires_words() {
        assert!(Cli::try_parse_from(["new_words", "count"]).is_err());
        let cli = Cli::parse_from(["new_words", "count", "путин", "трамп"]);
        assert_eq!(
            cli.command,
            Command::Count {
                words: vec!["путин".to_string(), "трамп".to_string()]
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "new_words",
            "analyze",
            "--json-output-dir",
            "/tmp/reports",
            "--feed-url",
            "https://example.com/rss",
        ]);
        assert_eq!(cli.command, Command::Analyze);
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/reports"));
        assert_eq!(
            cli.overrides.feed_url.as_deref(),
            Some("https://example.com/rss")
        );
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let mut config = AppConfig::default();
        let overrides = Overrides {
            locale: Some("en".to_string()),
            per_page: Some(0),
            database_url: Some("memory".to_string()),
            ..Overrides::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.feed.locale, "en");
        assert_eq!(config.feed.per_page, 1);
        assert_eq!(config.store.database_url, "memory");
        assert_eq!(config.feed.chrono, "news");
    }
}
