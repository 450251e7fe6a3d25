//! Durable counter store backed by SQLite.
//!
//! Counters live in a single `counters(key, value)` table. Increments are one
//! `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` statement, so SQLite's
//! write lock makes them atomic across connections.

use super::KeyValueStore;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Keys per `IN (...)` lookup; stays below SQLite's bound-parameter limit.
const MGET_CHUNK: usize = 500;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    ///
    /// In-memory databases are per-connection, so they get a single connection.
    #[instrument(level = "info", skip_all, fields(url = %url))]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }
        let max_connections = if in_memory { 1 } else { max_connections.max(1) };

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS counters (
                key TEXT PRIMARY KEY NOT NULL,
                value INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        info!(max_connections, "Connected to word store");
        Ok(Self { pool })
    }
}

impl KeyValueStore for SqliteStore {
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        let value = sqlx::query_scalar::<_, i64>(
            "INSERT INTO counters (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = value + excluded.value
             RETURNING value",
        )
        .bind(key)
        .bind(by)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let value = sqlx::query_scalar::<_, i64>("SELECT value FROM counters WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM counters WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<i64>>> {
        let mut found: HashMap<String, i64> = HashMap::with_capacity(keys.len());
        for chunk in keys.chunks(MGET_CHUNK) {
            let mut builder: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("SELECT key, value FROM counters WHERE key IN (");
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key.as_str());
            }
            separated.push_unseparated(")");

            let rows = builder.build().fetch_all(&self.pool).await?;
            for row in rows {
                found.insert(row.try_get("key")?, row.try_get("value")?);
            }
        }
        debug!(requested = keys.len(), found = found.len(), "mget");
        Ok(keys.iter().map(|key| found.get(key).copied()).collect())
    }

    async fn flush(&self) -> Result<()> {
        sqlx::query("DELETE FROM counters").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.pool.close().await;
        info!("Closed word store");
        Ok(())
    }
}
