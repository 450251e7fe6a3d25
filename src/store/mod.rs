//! Key-value boundary for the word counters.
//!
//! The aggregation store needs only six operations: atomic increment, point
//! read, prefix scan, multi-read, flush and close. Any engine offering atomic
//! increment and prefix scan satisfies the contract.
//!
//! # Backends
//!
//! | Backend | Module | Durable | Notes |
//! |---------|--------|---------|-------|
//! | SQLite | [`sqlite`] | yes | Default; one upsert statement per increment |
//! | In-process | [`memory`] | no | Tests and dry runs (`--database-url memory`) |

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::config::StoreConfig;
use crate::error::Result;
use tracing::info;

/// Operations the counting store must provide.
///
/// `incr_by` must be atomic under concurrent callers: two increments of the
/// same key always sum.
pub trait KeyValueStore {
    /// Add `by` to `key` (creating it at 0 first) and return the new value.
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64>;

    async fn get(&self, key: &str) -> Result<Option<i64>>;

    /// All keys starting with `prefix`, in ascending order.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Values for `keys`, positionally; missing keys yield `None`.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<i64>>>;

    /// Remove every key.
    async fn flush(&self) -> Result<()>;

    /// Release the underlying connection(s).
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Store selected by configuration.
#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    /// Open the backend named by `config.database_url`.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        if config.database_url == "memory" {
            info!("Using in-process word store; counts will not persist");
            return Ok(AnyStore::Memory(MemoryStore::new()));
        }
        let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
        Ok(AnyStore::Sqlite(store))
    }
}

impl KeyValueStore for AnyStore {
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        match self {
            AnyStore::Memory(s) => s.incr_by(key, by).await,
            AnyStore::Sqlite(s) => s.incr_by(key, by).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        match self {
            AnyStore::Memory(s) => s.get(key).await,
            AnyStore::Sqlite(s) => s.get(key).await,
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        match self {
            AnyStore::Memory(s) => s.keys(prefix).await,
            AnyStore::Sqlite(s) => s.keys(prefix).await,
        }
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<i64>>> {
        match self {
            AnyStore::Memory(s) => s.mget(keys).await,
            AnyStore::Sqlite(s) => s.mget(keys).await,
        }
    }

    async fn flush(&self) -> Result<()> {
        match self {
            AnyStore::Memory(s) => s.flush().await,
            AnyStore::Sqlite(s) => s.flush().await,
        }
    }

    async fn close(self) -> Result<()> {
        match self {
            AnyStore::Memory(s) => s.close().await,
            AnyStore::Sqlite(s) => s.close().await,
        }
    }
}
