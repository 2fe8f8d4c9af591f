//! Redis storage for the shared redirect table.

use super::service::{CacheError, CacheResult, TableCache};
use crate::domain::resolution::RedirectTable;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const TABLE_KEY: &str = "redirects:table";

/// The whole table as one JSON value under [`TABLE_KEY`], expiring after
/// `CACHE_TTL_SECONDS`.
///
/// Reads and writes never fail: a Redis error is logged and treated as a
/// miss (or a skipped write), and the caller falls back to the database.
pub struct RedisTableCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisTableCache {
    /// Opens a managed connection and checks it with `PING`.
    ///
    /// # Errors
    ///
    /// [`CacheError::ConnectionError`] for a bad URL, an unreachable server
    /// or a failed `PING`.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        let unreachable = |e: redis::RedisError| CacheError::ConnectionError(e.to_string());

        let client = Client::open(redis_url).map_err(unreachable)?;
        let mut conn = ConnectionManager::new(client).await.map_err(unreachable)?;
        conn.ping::<()>().await.map_err(unreachable)?;

        info!(ttl_seconds, "Connected to Redis");
        Ok(Self { conn, ttl_seconds })
    }

    /// `ConnectionManager` clones share one multiplexed connection.
    fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl TableCache for RedisTableCache {
    async fn get_table(&self) -> CacheResult<Option<RedirectTable>> {
        let raw = match self.connection().get::<_, Option<String>>(TABLE_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = TABLE_KEY, error = %e, "Redis GET failed");
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!(key = TABLE_KEY, "Shared table miss");
            return Ok(None);
        };

        match serde_json::from_str::<RedirectTable>(&raw) {
            Ok(table) => {
                debug!(key = TABLE_KEY, entries = table.len(), "Shared table hit");
                Ok(Some(table))
            }
            Err(e) => {
                warn!(key = TABLE_KEY, error = %e, "Discarding unreadable shared table");
                Ok(None)
            }
        }
    }

    async fn put_table(&self, table: &RedirectTable) -> CacheResult<()> {
        let payload = serde_json::to_string(table)
            .map_err(|e| CacheError::OperationError(format!("Failed to encode table: {e}")))?;

        let stored: redis::RedisResult<()> = self
            .connection()
            .set_ex(TABLE_KEY, payload, self.ttl_seconds)
            .await;

        match stored {
            Ok(()) => debug!(
                key = TABLE_KEY,
                entries = table.len(),
                ttl_seconds = self.ttl_seconds,
                "Shared table stored"
            ),
            Err(e) => warn!(key = TABLE_KEY, error = %e, "Redis SET failed"),
        }
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        let deleted: redis::RedisResult<u32> = self.connection().del(TABLE_KEY).await;

        match deleted {
            Ok(0) => {}
            Ok(_) => debug!(key = TABLE_KEY, "Shared table dropped"),
            Err(e) => warn!(key = TABLE_KEY, error = %e, "Redis DEL failed"),
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.connection().ping::<()>().await.is_ok()
    }
}
