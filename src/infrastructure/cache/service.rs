//! Shared table cache trait and error types.

use async_trait::async_trait;

use crate::domain::resolution::RedirectTable;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache for the built redirect table, shared between service instances.
///
/// Implementations are fail-open: backend errors are logged and reported as
/// a miss, so a broken cache degrades to rebuilding from the database.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisTableCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullTableCache`] - No-op implementation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableCache: Send + Sync {
    /// Returns the cached table, or `None` on a miss or backend error.
    async fn get_table(&self) -> CacheResult<Option<RedirectTable>>;

    /// Stores a freshly built table.
    async fn put_table(&self, table: &RedirectTable) -> CacheResult<()>;

    /// Drops the cached table so the next refresh rebuilds it.
    async fn clear(&self) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
