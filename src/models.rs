//! Data models for feed articles, per-day statistics and word counts.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleRecord`]: One feed item (title, description, publish timestamp)
//! - [`DayKey`]: The UTC calendar day used as the grouping key
//! - [`FeedDayStats`] / [`FullFeedStats`]: Per-day counters built during a full-feed scan
//! - [`DayRun`]: Outcome of processing a single requested day
//! - [`WordCount`]: One ranked entry of the word frequency table
//! - Search endpoint wire types: [`SearchResponse`], [`SearchResult`], [`SearchDocument`]
//!
//! Types returned to report consumers serialize with camelCase field names so
//! the JSON matches what the dashboard expects.

use crate::error::Error;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// A single article extracted from the feed or from the search endpoint.
///
/// Title and description are kept apart: they are tokenized independently.
/// The description has markup tags stripped but is otherwise unprocessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

impl ArticleRecord {
    /// The UTC calendar day this article belongs to.
    pub fn day_key(&self) -> DayKey {
        DayKey::from(self.published_at)
    }
}

/// Calendar day in `YYYY-MM-DD` form.
///
/// Derived from a publish timestamp by truncating to the UTC day. A requested
/// day covers the half-open interval `[00:00Z, 00:00Z + 24h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// UTC start of this day and the start of the following day.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.0.and_time(NaiveTime::MIN).and_utc();
        (start, start + chrono::Duration::hours(24))
    }

    /// Half-open membership test: `start <= ts < end`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds();
        ts >= start && ts < end
    }
}

impl From<DateTime<Utc>> for DayKey {
    fn from(ts: DateTime<Utc>) -> Self {
        Self(ts.date_naive())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = Error;

    /// Parse a strict `YYYY-MM-DD` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Validation {
            input: s.to_string(),
        };
        let bytes = s.as_bytes();
        let shape_ok = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shape_ok {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Counters for one day of a full-feed scan.
///
/// Created on the first article of its day, only ever incremented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDayStats {
    pub words_processed: u64,
    pub article_count: u64,
}

/// Per-day statistics keyed by day, ordered chronologically.
pub type FullFeedStats = BTreeMap<DayKey, FeedDayStats>;

/// Where the articles of a single-day run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleOrigin {
    /// The live RSS feed.
    Feed,
    /// The paginated search endpoint, consulted because the feed had nothing.
    Search,
}

/// Outcome of processing one requested day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRun {
    pub day: DayKey,
    pub origin: ArticleOrigin,
    pub article_count: u64,
    pub words_processed: u64,
}

/// One ranked entry of the frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Top-level shape of a search endpoint response.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: Option<SearchResult>,
}

/// One page of search results: ids in display order plus documents by id.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub collection: Vec<String>,
    #[serde(default)]
    pub documents: HashMap<String, Option<SearchDocument>>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Subtitle; stands in for a missing or blank description.
    #[serde(default)]
    pub second_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
}

impl SearchDocument {
    pub fn to_record(&self, published_at: DateTime<Utc>) -> ArticleRecord {
        ArticleRecord {
            title: self.title.as_deref().unwrap_or_default().trim().to_string(),
            description: [&self.description, &self.second_title]
                .into_iter()
                .filter_map(|text| text.as_deref().map(str::trim))
                .find(|text| !text.is_empty())
                .unwrap_or_default()
                .to_string(),
            published_at,
        }
    }
}

/// `published_at` arrives as unix seconds (number or numeric string) and,
/// on some documents, as an RFC-3339 string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTimestamp {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Int(secs) => DateTime::from_timestamp(*secs, 0),
            RawTimestamp::Float(secs) if secs.is_finite() => {
                DateTime::from_timestamp(secs.trunc() as i64, 0)
            }
            RawTimestamp::Float(_) => None,
            RawTimestamp::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(secs) => DateTime::from_timestamp(secs, 0),
                    Err(_) => DateTime::parse_from_rfc3339(text)
                        .ok()
                        .map(|ts| ts.with_timezone(&Utc)),
                }
            }
        }
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(RawTimestamp::to_utc))
}
