//! No-op table cache.

use super::service::{CacheResult, TableCache};
use crate::domain::resolution::RedirectTable;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is not configured or unreachable at startup. Every
/// instance then rebuilds its table straight from the database.
pub struct NullTableCache;

impl NullTableCache {
    pub fn new() -> Self {
        debug!("Using NullTableCache (shared caching disabled)");
        Self
    }
}

impl Default for NullTableCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableCache for NullTableCache {
    async fn get_table(&self) -> CacheResult<Option<RedirectTable>> {
        Ok(None)
    }

    async fn put_table(&self, _table: &RedirectTable) -> CacheResult<()> {
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullTableCache::new();

        cache.put_table(&RedirectTable::empty()).await.unwrap();

        assert!(cache.get_table().await.unwrap().is_none());
        assert!(cache.health_check().await);
    }
}
