//! Word frequency aggregation over a [`KeyValueStore`].
//!
//! Counters live under the `word:<token>` key namespace. The aggregator owns
//! its store handle: every mutation of counts goes through it, and
//! [`WordAggregator::close`] releases the handle once the run is over.

use crate::error::Result;
use crate::models::WordCount;
use crate::store::KeyValueStore;
use crate::tokenizer::tokenize;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// Namespace prefix for word counters.
pub const WORD_PREFIX: &str = "word:";

/// Totals reported to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStats {
    pub total_unique_words: usize,
    pub top_words: Vec<WordCount>,
}

#[derive(Debug)]
pub struct WordAggregator<S> {
    store: S,
}

impl<S: KeyValueStore> WordAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Add `by` occurrences of `word`, returning its new total.
    pub async fn increment(&self, word: &str, by: u64) -> Result<u64> {
        let by = i64::try_from(by).unwrap_or(i64::MAX);
        let total = self.store.incr_by(&word_key(word), by).await?;
        Ok(non_negative(total))
    }

    /// Current count for `word`; 0 when it has never been seen.
    pub async fn word_count(&self, word: &str) -> Result<u64> {
        Ok(self
            .store
            .get(&word_key(word))
            .await?
            .map(non_negative)
            .unwrap_or(0))
    }

    /// Number of distinct words with a non-zero counter.
    pub async fn total_unique_words(&self) -> Result<usize> {
        Ok(self.nonzero_counts().await?.len())
    }

    /// The `k` most frequent words, by descending count.
    ///
    /// Equal counts are ordered by word so the result is stable for a given
    /// snapshot of the store.
    pub async fn top_words(&self, k: usize) -> Result<Vec<WordCount>> {
        let top = self
            .nonzero_counts()
            .await?
            .into_iter()
            .sorted_by_key(|wc| (Reverse(wc.count), wc.word.clone()))
            .take(k)
            .collect();
        Ok(top)
    }

    /// Totals and the top `limit` words in one call.
    pub async fn stats(&self, limit: usize) -> Result<WordStats> {
        Ok(WordStats {
            total_unique_words: self.total_unique_words().await?,
            top_words: self.top_words(limit).await?,
        })
    }

    /// Drop every counter. Safe to call repeatedly.
    #[instrument(level = "info", skip_all)]
    pub async fn clear_all(&self) -> Result<()> {
        self.store.flush().await?;
        info!("Cleared all word counts");
        Ok(())
    }

    /// Tokenize `text` and count each token once per occurrence.
    ///
    /// Returns the number of tokens processed.
    pub async fn process_text(&self, text: &str) -> Result<u64> {
        let tokens = tokenize(text);
        for token in &tokens {
            self.increment(token, 1).await?;
        }
        debug!(tokens = tokens.len(), "Processed text");
        Ok(tokens.len() as u64)
    }

    /// Release the store handle.
    pub async fn close(self) -> Result<()> {
        self.store.close().await
    }

    async fn nonzero_counts(&self) -> Result<Vec<WordCount>> {
        let keys = self.store.keys(WORD_PREFIX).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let values = self.store.mget(&keys).await?;

        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| {
                let count = non_negative(value?);
                let word = key.strip_prefix(WORD_PREFIX)?;
                (count > 0).then(|| WordCount {
                    word: word.to_string(),
                    count,
                })
            })
            .collect())
    }
}

fn word_key(word: &str) -> String {
    format!("{WORD_PREFIX}{word}")
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
