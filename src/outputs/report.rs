//! Request/response operations for the reporting surface.
//!
//! Each function performs one operation against the pipeline and returns a
//! serializable report carrying the data model as-is. Field names are
//! camelCase to match what the dashboard consumes.

use crate::aggregator::WordAggregator;
use crate::bucketer::DateBucketer;
use crate::error::Result;
use crate::models::{DayKey, DayRun, FullFeedStats, WordCount};
use crate::sources::FeedSource;
use crate::store::KeyValueStore;
use crate::tokenizer::tokenize;
use serde::Serialize;

/// Number of top words reported when no limit is given.
pub const DEFAULT_TOP_WORDS: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub success: bool,
    pub stats: FullFeedStats,
    pub total_words: u64,
    pub total_articles: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Distinct words with a non-zero count.
    pub total_words: usize,
    pub top_words: Vec<WordCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub success: bool,
    pub message: String,
}

/// Analyze the whole live feed and report per-day statistics.
pub async fn analyze<F, S>(source: &F, aggregator: &WordAggregator<S>) -> Result<AnalyzeReport>
where
    F: FeedSource,
    S: KeyValueStore,
{
    let stats = DateBucketer::new(source, aggregator)
        .analyze_full_feed()
        .await?;
    Ok(AnalyzeReport {
        success: true,
        total_words: stats.values().map(|s| s.words_processed).sum(),
        total_articles: stats.values().map(|s| s.article_count).sum(),
        stats,
        message: "Feed analysis completed".to_string(),
    })
}

/// Process a single day (the batch job's unit of work).
pub async fn process<F, S>(
    source: &F,
    aggregator: &WordAggregator<S>,
    day: DayKey,
) -> Result<DayRun>
where
    F: FeedSource,
    S: KeyValueStore,
{
    DateBucketer::new(source, aggregator).process_day(day).await
}

/// Current totals and the `limit` most frequent words.
pub async fn stats<S: KeyValueStore>(
    aggregator: &WordAggregator<S>,
    limit: usize,
) -> Result<StatsReport> {
    let stats = aggregator.stats(limit).await?;
    Ok(StatsReport {
        total_words: stats.total_unique_words,
        top_words: stats.top_words,
    })
}

/// Current counts for specific words, in the order asked.
///
/// Each argument is tokenized the same way article text is, so `Новости!`
/// and `новости` report the same counter. An argument that yields no token
/// is reported lower-cased with a count of 0.
pub async fn counts<S: KeyValueStore>(
    aggregator: &WordAggregator<S>,
    words: &[String],
) -> Result<Vec<WordCount>> {
    let mut counts = Vec::with_capacity(words.len());
    for raw in words {
        let tokens = tokenize(raw);
        if tokens.is_empty() {
            counts.push(WordCount {
                word: raw.trim().to_lowercase(),
                count: 0,
            });
            continue;
        }
        for word in tokens {
            let count = aggregator.word_count(&word).await?;
            counts.push(WordCount { word, count });
        }
    }
    Ok(counts)
}

/// Reset every counter.
pub async fn clear<S: KeyValueStore>(aggregator: &WordAggregator<S>) -> Result<ClearReport> {
    aggregator.clear_all().await?;
    Ok(ClearReport {
        success: true,
        message: "Database cleared successfully".to_string(),
    })
}
