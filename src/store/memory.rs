//! In-process counter store.

use super::KeyValueStore;
use crate::error::Result;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Ordered map behind a mutex; every operation is one critical section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        let value = entries.entry(key.to_string()).or_insert(0);
        *value = value.saturating_add(by);
        Ok(*value)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.entries.lock().await.get(key).copied())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<i64>>> {
        let entries = self.entries.lock().await;
        Ok(keys.iter().map(|key| entries.get(key).copied()).collect())
    }

    async fn flush(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
