//! HTTP-backed [`FeedSource`].
//!
//! One `reqwest` client with a bounded timeout serves both endpoints. The
//! RSS request asks for XML content types; search requests ask for JSON and
//! carry `chrono`, `page`, `per_page` and `locale` query parameters.
//!
//! # Search pagination
//!
//! Results are assumed newest first. Paging stops when a page is empty, when
//! a document older than the requested day shows up, when `next_page` is
//! absent, or after `max_pages` pages.

use super::FeedSource;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::models::{ArticleRecord, DayKey, SearchResponse};
use crate::utils::truncate_for_log;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

const RSS_ACCEPT: &str = "application/rss+xml, application/xml, text/xml";
const JSON_ACCEPT: &str = "application/json";
/// Characters of a failed response body kept for diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    config: FeedConfig,
}

impl HttpFeedSource {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client, config })
    }

    /// GET `url`, mapping transport failures and non-success statuses to
    /// network errors.
    async fn get(&self, url: &str, accept: &'static str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(accept))
            .send()
            .await
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_for_log(body.trim(), BODY_EXCERPT_CHARS),
            });
        }
        Ok(response)
    }

    fn search_page_url(&self, page: u32) -> Result<Url> {
        let per_page = self.config.per_page.max(1).to_string();
        let page = page.to_string();
        Url::parse_with_params(
            &self.config.search_url,
            [
                ("chrono", self.config.chrono.as_str()),
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
                ("locale", self.config.locale.as_str()),
            ],
        )
        .map_err(|e| Error::Config {
            path: "search_url".to_string(),
            message: e.to_string(),
        })
    }

    async fn fetch_search_page(&self, page: u32) -> Result<SearchResponse> {
        let url = self.search_page_url(page)?;
        let body = self
            .get(url.as_str(), JSON_ACCEPT)
            .await?
            .text()
            .await
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Walk the search pages for `day`, failing on the first bad page.
    async fn search_pages(&self, day: DayKey) -> Result<Vec<ArticleRecord>> {
        let (start, end) = day.bounds();
        let mut articles = Vec::new();
        let mut page = 0u32;

        for _ in 0..self.config.max_pages.max(1) {
            let Some(result) = self.fetch_search_page(page).await?.result else {
                break;
            };
            if result.collection.is_empty() {
                break;
            }

            let mut reached_earlier_day = false;
            for id in &result.collection {
                let Some(doc) = result.documents.get(id).and_then(Option::as_ref) else {
                    continue;
                };
                let Some(published_at) = doc.published_at else {
                    continue;
                };
                if published_at >= end {
                    continue;
                }
                if published_at < start {
                    reached_earlier_day = true;
                    break;
                }
                articles.push(doc.to_record(published_at));
            }
            debug!(page, collected = articles.len(), "Fetched search page");

            if reached_earlier_day {
                break;
            }
            page = match result.next_page {
                Some(next) if next > page => next,
                Some(_) => page + 1,
                None => break,
            };
        }

        Ok(articles)
    }
}

impl FeedSource for HttpFeedSource {
    #[instrument(level = "info", skip_all, fields(url = %self.config.feed_url))]
    async fn fetch_feed(&self) -> Result<String> {
        let t0 = Instant::now();
        let url = self.config.feed_url.as_str();
        let body = self
            .get(url, RSS_ACCEPT)
            .await?
            .text()
            .await
            .map_err(|source| Error::Http {
                url: url.to_string(),
                source,
            })?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        Ok(body)
    }

    #[instrument(level = "info", skip_all, fields(day = %day))]
    async fn search_by_date(&self, day: DayKey) -> Vec<ArticleRecord> {
        match self.search_pages(day).await {
            Ok(articles) => {
                info!(count = articles.len(), "Search fallback finished");
                articles
            }
            Err(e) => {
                warn!(error = %e, "Search fallback failed; treating day as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> FeedConfig {
        FeedConfig {
            feed_url: format!("{}/rss/all", server.url()),
            search_url: format!("{}/api/w5/search", server.url()),
            user_agent: "new-words-test/1.0".to_string(),
            timeout_secs: 5,
            per_page: 2,
            ..FeedConfig::default()
        }
    }

    fn page_query(page: u32) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), page.to_string()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
            Matcher::UrlEncoded("chrono".into(), "news".into()),
            Matcher::UrlEncoded("locale".into(), "ru".into()),
        ])
    }

    fn day() -> DayKey {
        "2025-10-21".parse().unwrap()
    }

    // 2025-10-21T00:00:00Z
    const DAY_START: i64 = 1_761_004_800;

    #[tokio::test]
    async fn test_fetch_feed_sends_headers_and_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rss/all")
            .match_header("user-agent", "new-words-test/1.0")
            .match_header("accept", RSS_ACCEPT)
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body("<rss><channel></channel></rss>")
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        let body = source.fetch_feed().await.unwrap();

        assert_eq!(body, "<rss><channel></channel></rss>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_feed_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rss/all")
            .with_status(503)
            .with_body("maintenance window")
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        let err = source.fetch_feed().await.unwrap_err();

        assert!(err.is_network());
        match err {
            Error::HttpStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance window");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_feed_unreachable_is_network_error() {
        let config = FeedConfig {
            feed_url: "http://127.0.0.1:9/rss".to_string(),
            timeout_secs: 2,
            ..FeedConfig::default()
        };
        let source = HttpFeedSource::new(config).unwrap();
        let err = source.fetch_feed().await.unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
    }

    #[tokio::test]
    async fn test_search_pages_until_earlier_day() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(0))
            .match_header("accept", JSON_ACCEPT)
            .with_status(200)
            .with_body(format!(
                r#"{{"result": {{
                    "collection": ["tomorrow", "late"],
                    "documents": {{
                        "tomorrow": {{"title": "Too new", "published_at": {}}},
                        "late": {{"title": "Late news", "second_title": "Evening", "published_at": {}}}
                    }},
                    "next_page": 1
                }}}}"#,
                DAY_START + 86_400,
                DAY_START + 80_000
            ))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(1))
            .with_status(200)
            .with_body(format!(
                r#"{{"result": {{
                    "collection": ["early", "yesterday"],
                    "documents": {{
                        "early": {{"title": "Early news", "published_at": {}}},
                        "yesterday": {{"title": "Old news", "published_at": {}}}
                    }},
                    "next_page": 2
                }}}}"#,
                DAY_START,
                DAY_START - 1
            ))
            .create_async()
            .await;
        let third = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(2))
            .with_status(200)
            .with_body(r#"{"result": {"collection": []}}"#)
            .expect(0)
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        let articles = source.search_by_date(day()).await;

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Late news", "Early news"]);
        assert_eq!(articles[0].description, "Evening");
        assert_eq!(
            articles[1].published_at,
            Utc.with_ymd_and_hms(2025, 10, 21, 0, 0, 0).unwrap()
        );
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_stops_without_next_page() {
        let mut server = mockito::Server::new_async().await;
        let only = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(0))
            .with_status(200)
            .with_body(format!(
                r#"{{"result": {{
                    "collection": ["a"],
                    "documents": {{"a": {{"title": "Only one", "published_at": {}}}}},
                    "next_page": null
                }}}}"#,
                DAY_START + 3_600
            ))
            .expect(1)
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        let articles = source.search_by_date(day()).await;

        assert_eq!(articles.len(), 1);
        only.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_respects_max_pages() {
        let mut server = mockito::Server::new_async().await;
        let looping = server
            .mock("GET", "/api/w5/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"{{"result": {{
                    "collection": ["a"],
                    "documents": {{"a": {{"title": "Same again", "published_at": {}}}}},
                    "next_page": 0
                }}}}"#,
                DAY_START + 60
            ))
            .expect(3)
            .create_async()
            .await;

        let config = FeedConfig {
            max_pages: 3,
            ..config_for(&server)
        };
        let source = HttpFeedSource::new(config).unwrap();
        let articles = source.search_by_date(day()).await;

        assert_eq!(articles.len(), 3);
        looping.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_fails_softly_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _error = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(0))
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        assert!(source.search_by_date(day()).await.is_empty());
        assert!(source.search_pages(day()).await.unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_search_fails_softly_on_garbage() {
        let mut server = mockito::Server::new_async().await;
        let _garbage = server
            .mock("GET", "/api/w5/search")
            .match_query(page_query(0))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let source = HttpFeedSource::new(config_for(&server)).unwrap();
        assert!(source.search_by_date(day()).await.is_empty());
        assert!(matches!(
            source.search_pages(day()).await,
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_search_page_url_clamps_per_page() {
        let config = FeedConfig {
            search_url: "https://example.com/api/w5/search".to_string(),
            per_page: 0,
            locale: "en".to_string(),
            ..FeedConfig::default()
        };
        let source = HttpFeedSource::new(config).unwrap();
        let url = source.search_page_url(3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/w5/search?chrono=news&page=3&per_page=1&locale=en"
        );
    }
}
