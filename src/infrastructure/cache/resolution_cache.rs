//! In-process redirect table with snapshot-and-swap rebuilds.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use super::service::TableCache;
use crate::domain::entities::{NodeSnapshot, RedirectRule};
use crate::domain::repositories::{ContentNodeRepository, RedirectRepository, snapshot_of};
use crate::domain::resolution::{RedirectTable, ResolvedRedirect};
use crate::error::AppError;

const RETRY_BASE_MS: u64 = 50;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Errors from rebuilding the lookup table.
#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    #[error("failed to load redirect rules: {0}")]
    Load(#[from] AppError),
}

/// Point-in-time view of the cache for health reporting.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub entries: usize,
    pub built_at: Option<chrono::DateTime<chrono::Utc>>,
    pub stale: bool,
}

/// Resolves request paths against the current [`RedirectTable`].
///
/// Readers clone the current `Arc` under a brief read lock and never see a
/// partially built table. A rebuild builds a complete new table off to the
/// side and swaps it in. When a rebuild fails the previous table keeps
/// serving and the cache is flagged stale until the next success.
pub struct ResolutionCache<R: RedirectRepository, N: ContentNodeRepository> {
    current: RwLock<Arc<RedirectTable>>,
    stale: AtomicBool,
    rebuild_lock: Mutex<()>,
    rules: Arc<R>,
    nodes: Arc<N>,
    shared: Arc<dyn TableCache>,
    retry_attempts: usize,
}

impl<R: RedirectRepository, N: ContentNodeRepository> ResolutionCache<R, N> {
    /// Creates a cache serving an empty table until the first rebuild.
    ///
    /// `retry_attempts` is the number of extra tries for loading rules from
    /// the database during a rebuild.
    pub fn new(
        rules: Arc<R>,
        nodes: Arc<N>,
        shared: Arc<dyn TableCache>,
        retry_attempts: usize,
    ) -> Self {
        Self {
            current: RwLock::new(Arc::new(RedirectTable::empty())),
            stale: AtomicBool::new(true),
            rebuild_lock: Mutex::new(()),
            rules,
            nodes,
            shared,
            retry_attempts,
        }
    }

    /// Maps a request path to its redirect, if any.
    pub fn resolve(&self, request_path: &str) -> Option<ResolvedRedirect> {
        self.snapshot().lookup(request_path).cloned()
    }

    /// The table currently being served.
    pub fn snapshot(&self) -> Arc<RedirectTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True until the first successful build and after any failed one.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    pub fn status(&self) -> CacheStatus {
        let table = self.snapshot();
        CacheStatus {
            entries: table.len(),
            built_at: table.built_at(),
            stale: self.is_stale(),
        }
    }

    /// Rebuilds from the database and publishes to the shared cache.
    ///
    /// # Errors
    ///
    /// Returns [`RebuildError`] if rules cannot be loaded after all retries.
    /// The previous table stays in service.
    pub async fn rebuild(&self) -> Result<Arc<RedirectTable>, RebuildError> {
        let _guard = self.rebuild_lock.lock().await;
        self.rebuild_locked().await
    }

    /// Drops the shared table and rebuilds from the database.
    ///
    /// Called after every committed create, update or delete.
    ///
    /// # Errors
    ///
    /// See [`ResolutionCache::rebuild`].
    pub async fn invalidate(&self) -> Result<Arc<RedirectTable>, RebuildError> {
        let _guard = self.rebuild_lock.lock().await;

        if let Err(e) = self.shared.clear().await {
            warn!(error = %e, "Failed to clear shared redirect table");
        }

        self.rebuild_locked().await
    }

    /// Adopts the shared table if one exists, otherwise rebuilds.
    ///
    /// Used by the periodic refresher so that invalidations made by other
    /// processes propagate without every instance hitting the database.
    ///
    /// # Errors
    ///
    /// See [`ResolutionCache::rebuild`].
    pub async fn refresh(&self) -> Result<Arc<RedirectTable>, RebuildError> {
        let _guard = self.rebuild_lock.lock().await;

        match self.shared.get_table().await {
            Ok(Some(table)) => {
                debug!(entries = table.len(), "Adopting shared redirect table");
                Ok(self.publish(table))
            }
            Ok(None) => self.rebuild_locked().await,
            Err(e) => {
                warn!(error = %e, "Shared redirect table unavailable");
                self.rebuild_locked().await
            }
        }
    }

    /// Runs [`ResolutionCache::refresh`] every `every` until the task is aborted.
    pub fn spawn_refresher(self: Arc<Self>, every: Duration) -> JoinHandle<()>
    where
        R: 'static,
        N: 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; startup already built.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "Periodic redirect table refresh failed");
                }
            }
        })
    }

    async fn rebuild_locked(&self) -> Result<Arc<RedirectTable>, RebuildError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(RETRY_BASE_MS / 2)
            .max_delay(RETRY_MAX_DELAY)
            .map(jitter)
            .take(self.retry_attempts);

        let loaded = Retry::spawn(strategy, || self.load_source()).await;

        let (rules, nodes) = match loaded {
            Ok(source) => source,
            Err(e) => {
                self.stale.store(true, Ordering::Release);
                metrics::counter!("redirect_table_rebuilds_total", "outcome" => "failure")
                    .increment(1);
                warn!(error = %e, "Redirect table rebuild failed, keeping previous table");
                return Err(e.into());
            }
        };

        let table = RedirectTable::build(&rules, &nodes);

        if let Err(e) = self.shared.put_table(&table).await {
            warn!(error = %e, "Failed to publish redirect table to shared cache");
        }

        metrics::counter!("redirect_table_rebuilds_total", "outcome" => "success").increment(1);
        info!(
            rules = rules.len(),
            entries = table.len(),
            "Redirect table rebuilt"
        );

        Ok(self.publish(table))
    }

    async fn load_source(&self) -> Result<(Vec<RedirectRule>, NodeSnapshot), AppError> {
        let rules = self.rules.load_all().await?;

        let ids: Vec<_> = rules
            .iter()
            .flat_map(|rule| [rule.from.node, rule.to.node])
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let nodes = snapshot_of(self.nodes.as_ref(), &ids).await?;
        Ok((rules, nodes))
    }

    fn publish(&self, table: RedirectTable) -> Arc<RedirectTable> {
        let table = Arc::new(table);
        metrics::gauge!("redirect_table_entries").set(table.len() as f64);

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&table);
        self.stale.store(false, Ordering::Release);

        table
    }
}
