//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: DB, shared cache, redirect table (public)
//! - `/api/*`            - REST API (Bearer token with `MANAGE_REDIRECTS`)
//! - everything else     - Redirect resolution (public), 404 when no rule matches
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the API (configurable for proxy deployments)
//! - **Authentication** - Bearer token with permission check
//!
//! Paths are not normalized by middleware: the redirect table normalizes
//! lookups itself, and trimming trailing slashes would break canonical
//! `/path/` sources.

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> Router {
    let api_router = rate_limit::apply(
        api::routes::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer)),
        rate_limit::SECURE,
        behind_proxy,
    );

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .fallback(redirect_handler)
        .with_state(state)
        .layer(tracing::layer())
}
