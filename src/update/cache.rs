//! Key/value caches backing the release fetcher
//!
//! The engine only relies on the [`Cache`] contract; freshness is decided by each
//! backend through its TTL.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::update::error::CacheError;

/// Asynchronous key/value store
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
}

/// In-process cache with optional expiry
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, String)>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Creates a cache whose entries never expire
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: None,
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, (Instant, String)>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock_entries()?;

        let expired = match (entries.get(key), self.ttl) {
            (None, _) => return Ok(None),
            (Some((stored_at, _)), Some(ttl)) => stored_at.elapsed() >= ttl,
            (Some(_), None) => false,
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|(_, value)| value.clone()))
    }

    /// Also drops every expired entry so keys never requested again do not pile up
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut entries = self.lock_entries()?;

        if let Some(ttl) = self.ttl {
            entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        }

        entries.insert(key.to_string(), (Instant::now(), value));
        Ok(())
    }
}

/// Persistent cache stored in a SQLite database
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
    ttl_ms: i64,
}

impl SqliteCache {
    pub fn new(db_path: &Path, ttl_ms: i64) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        info!("Cache initialized successfully");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ttl_ms,
        })
    }

    /// Runs a blocking database operation off the async runtime
    async fn with_conn<T, F>(&self, f: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CacheError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| CacheError::LockPoisoned)?;
            f(&conn)
        })
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
    }
}

#[async_trait::async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = key.to_string();
        let oldest_fresh = chrono::Utc::now().timestamp_millis() - self.ttl_ms;

        self.with_conn(move |conn| {
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM entries WHERE key = ?1 AND updated_at > ?2",
                    (&key, oldest_fresh),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let key = key.to_string();
        let now = chrono::Utc::now().timestamp_millis();
        let oldest_fresh = now - self.ttl_ms;

        self.with_conn(move |conn| {
            let evicted = conn.execute("DELETE FROM entries WHERE updated_at <= ?1", [oldest_fresh])?;
            if evicted > 0 {
                debug!("Evicted {} stale cache entries", evicted);
            }

            conn.execute(
                r#"
                INSERT INTO entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                (&key, &value, now),
            )?;
            Ok(())
        })
        .await
    }
}
