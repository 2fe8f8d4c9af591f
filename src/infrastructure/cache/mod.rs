//! Caching layer for redirect resolution.
//!
//! - [`ResolutionCache`] - In-process lookup table, rebuilt and swapped whole
//! - [`TableCache`] - Table storage shared between processes, with
//!   [`RedisTableCache`] and the no-op [`NullTableCache`]

mod null_cache;
mod redis_cache;
pub mod resolution_cache;
mod service;

pub use null_cache::NullTableCache;
pub use redis_cache::RedisTableCache;
pub use resolution_cache::{CacheStatus, RebuildError, ResolutionCache};
pub use service::{CacheError, CacheResult, TableCache};

#[cfg(test)]
pub use service::MockTableCache;
