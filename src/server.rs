//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, the initial table load, the
//! background refresher and the Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::cache::{NullTableCache, RedisTableCache, TableCache};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Shared table cache (Redis, or NullTableCache fallback)
/// - Redirect table (shared copy if present, otherwise built from the database)
/// - Background refresher
/// - Axum HTTP server with graceful shutdown on Ctrl-C
///
/// A failed initial load is logged and the server starts with an empty,
/// stale table; the refresher keeps retrying.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let table_cache = connect_table_cache(&config).await;

    let state = AppState::new(
        Arc::new(pool),
        table_cache,
        config.token_signing_secret.clone(),
        config.table.rebuild_retry_attempts,
    );

    match state.resolution_cache.refresh().await {
        Ok(table) => tracing::info!(entries = table.len(), "Redirect table loaded"),
        Err(e) => tracing::warn!(error = %e, "Initial redirect table load failed, serving empty table"),
    }

    let refresher = config
        .table
        .refresh_interval
        .map(|every| state.resolution_cache.clone().spawn_refresher(every));

    let app = app_router(state, config.behind_proxy);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = refresher {
        handle.abort();
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects the shared table cache, falling back to a no-op cache.
pub async fn connect_table_cache(config: &Config) -> Arc<dyn TableCache> {
    let Some(redis_url) = &config.table.redis_url else {
        tracing::info!("Shared table cache disabled (NullTableCache)");
        return Arc::new(NullTableCache::new());
    };

    match RedisTableCache::connect(redis_url, config.table.shared_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Shared table cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullTableCache.", e);
            Arc::new(NullTableCache::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
