//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, RedirectService};
use crate::domain::resolution::ValidationPipeline;
use crate::infrastructure::cache::{ResolutionCache, TableCache};
use crate::infrastructure::persistence::{
    PgContentNodeRepository, PgRedirectRepository, PgTokenRepository,
};

pub type PgResolutionCache = ResolutionCache<PgRedirectRepository, PgContentNodeRepository>;
pub type PgRedirectService = RedirectService<PgRedirectRepository, PgContentNodeRepository>;

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<PgRedirectService>,
    pub resolution_cache: Arc<PgResolutionCache>,
    pub auth_service: Arc<AuthService<PgTokenRepository>>,
    pub table_cache: Arc<dyn TableCache>,
    pub db: Arc<PgPool>,
}

impl AppState {
    /// Wires repositories, the resolution cache and services over one pool.
    ///
    /// The resolution cache starts empty and stale; callers decide when to
    /// load it (the server refreshes before it starts listening).
    pub fn new(
        pool: Arc<PgPool>,
        table_cache: Arc<dyn TableCache>,
        signing_secret: String,
        rebuild_retry_attempts: usize,
    ) -> Self {
        let redirect_repo = Arc::new(PgRedirectRepository::new(pool.clone()));
        let node_repo = Arc::new(PgContentNodeRepository::new(pool.clone()));
        let token_repo = Arc::new(PgTokenRepository::new(pool.clone()));

        let resolution_cache = Arc::new(ResolutionCache::new(
            redirect_repo.clone(),
            node_repo.clone(),
            table_cache.clone(),
            rebuild_retry_attempts,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            redirect_repo,
            node_repo,
            resolution_cache.clone(),
            ValidationPipeline::new(),
        ));

        Self {
            redirect_service,
            resolution_cache,
            auth_service: Arc::new(AuthService::new(token_repo, signing_secret)),
            table_cache,
            db: pool,
        }
    }
}
