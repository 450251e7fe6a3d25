//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file
//! (`--config`), then environment variables and command-line flags (see
//! [`crate::cli::Overrides::apply`]). Every YAML key is optional.
//!
//! ```yaml
//! feed:
//!   feed_url: https://meduza.io/rss/all
//!   search_url: https://meduza.io/api/w5/search
//!   locale: en
//!   per_page: 50
//! store:
//!   database_url: sqlite:///var/lib/new_words/counts.db
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_FEED_URL: &str = "https://meduza.io/rss/all";
pub const DEFAULT_SEARCH_URL: &str = "https://meduza.io/api/w5/search";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub store: StoreConfig,
}

/// Where and how the feed and the search fallback are fetched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub feed_url: String,
    pub search_url: String,
    pub user_agent: String,
    /// Upper bound for any single request, connect included.
    pub timeout_secs: u64,
    pub locale: String,
    /// Search ordering mode (`news` lists newest first).
    pub chrono: String,
    pub per_page: u32,
    /// Hard cap on search pages fetched for one day.
    pub max_pages: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: format!(
                "Mozilla/5.0 (compatible; new-words/{})",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
            locale: "ru".to_string(),
            chrono: "news".to_string(),
            per_page: 100,
            max_pages: 50,
        }
    }
}

/// Which counter store to open.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `sqlite://...` URL, or `memory` for a throwaway in-process store.
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://new_words.db".to_string(),
            max_connections: 4,
        }
    }
}

impl AppConfig {
    /// Defaults, or defaults overlaid with the YAML file at `path`.
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        let config = Self::from_yaml(&text).map_err(|e| Error::Config {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        info!(config_path = %path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}
