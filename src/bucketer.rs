//! Day bucketing: the two ways a run turns feed items into word counts.
//!
//! - **Full-feed mode** ([`DateBucketer::analyze_full_feed`]): every item with
//!   a usable publish date is counted and grouped under its UTC day.
//! - **Single-day mode** ([`DateBucketer::process_day`]): only items inside
//!   `[day 00:00Z, day 00:00Z + 24h)` are counted. When the feed has none,
//!   the search fallback is used instead; the two are never merged.
//!
//! Title and description of each article are tokenized separately and both
//! contribute to `wordsProcessed`.

use crate::aggregator::WordAggregator;
use crate::error::Result;
use crate::extract::extract_items;
use crate::models::{ArticleOrigin, ArticleRecord, DayKey, DayRun, FullFeedStats};
use crate::sources::FeedSource;
use crate::store::KeyValueStore;
use tracing::{info, instrument};

pub struct DateBucketer<'a, F, S> {
    source: &'a F,
    aggregator: &'a WordAggregator<S>,
}

impl<'a, F, S> DateBucketer<'a, F, S>
where
    F: FeedSource,
    S: KeyValueStore,
{
    pub fn new(source: &'a F, aggregator: &'a WordAggregator<S>) -> Self {
        Self { source, aggregator }
    }

    /// Count every article of the live feed, grouped by publish day.
    #[instrument(level = "info", skip_all)]
    pub async fn analyze_full_feed(&self) -> Result<FullFeedStats> {
        let document = self.source.fetch_feed().await?;
        let mut stats = FullFeedStats::new();

        for article in extract_items(&document) {
            let words = self.count_article(&article).await?;
            let day = stats.entry(article.day_key()).or_default();
            day.article_count += 1;
            day.words_processed += words;
        }

        for (day, day_stats) in stats.iter().rev() {
            info!(
                %day,
                words_processed = day_stats.words_processed,
                article_count = day_stats.article_count,
                "Day summary"
            );
        }
        info!(
            days = stats.len(),
            total_words = stats.values().map(|s| s.words_processed).sum::<u64>(),
            total_articles = stats.values().map(|s| s.article_count).sum::<u64>(),
            "Full feed analyzed"
        );
        Ok(stats)
    }

    /// Count the articles published on `day`.
    #[instrument(level = "info", skip_all, fields(day = %day))]
    pub async fn process_day(&self, day: DayKey) -> Result<DayRun> {
        let (origin, articles) = self.articles_for_day(day).await?;

        let mut words_processed = 0;
        for article in &articles {
            words_processed += self.count_article(article).await?;
        }

        let run = DayRun {
            day,
            origin,
            article_count: articles.len() as u64,
            words_processed,
        };
        info!(
            origin = ?run.origin,
            article_count = run.article_count,
            words_processed = run.words_processed,
            "Processed day"
        );
        Ok(run)
    }

    /// Feed articles for `day`, or the search fallback's when there are none.
    pub async fn articles_for_day(
        &self,
        day: DayKey,
    ) -> Result<(ArticleOrigin, Vec<ArticleRecord>)> {
        let document = self.source.fetch_feed().await?;
        let from_feed: Vec<_> = extract_items(&document)
            .filter(|article| day.contains(article.published_at))
            .collect();

        if !from_feed.is_empty() {
            info!(count = from_feed.len(), "Found articles in feed");
            return Ok((ArticleOrigin::Feed, from_feed));
        }

        info!("No feed articles for day; consulting search fallback");
        let from_search = self.source.search_by_date(day).await;
        Ok((ArticleOrigin::Search, from_search))
    }

    async fn count_article(&self, article: &ArticleRecord) -> Result<u64> {
        let title_words = self.aggregator.process_text(&article.title).await?;
        let description_words = self.aggregator.process_text(&article.description).await?;
        Ok(title_words + description_words)
    }
}
