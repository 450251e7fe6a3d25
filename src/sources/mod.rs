//! Article sources: the live RSS feed and the historical search fallback.
//!
//! # Sources
//!
//! | Operation | Endpoint | Failure mode |
//! |-----------|----------|--------------|
//! | [`FeedSource::fetch_feed`] | RSS document (`feed_url`) | Fatal: network error with status and body excerpt |
//! | [`FeedSource::search_by_date`] | Paginated JSON search (`search_url`) | Soft: empty result |
//!
//! The search endpoint is only consulted when the feed has nothing for the
//! requested day; both paths yield the same [`ArticleRecord`] shape.

pub mod http;

pub use http::HttpFeedSource;

use crate::error::Result;
use crate::models::{ArticleRecord, DayKey};

pub trait FeedSource {
    /// Fetch the raw feed document.
    async fn fetch_feed(&self) -> Result<String>;

    /// Articles published on `day` according to the search endpoint.
    ///
    /// Never fails: any transport or decoding problem yields an empty list,
    /// since "no historical data" is a legitimate outcome.
    async fn search_by_date(&self, day: DayKey) -> Vec<ArticleRecord>;
}
