//! API route configuration.
//!
//! All API endpoints require a Bearer token carrying `MANAGE_REDIRECTS`, see
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler,
    rebuild_cache_handler, redirect_list_handler, update_redirect_handler,
    validate_redirect_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /redirects`           - Search rules (paginated)
/// - `POST   /redirects`           - Create a rule
/// - `POST   /redirects/validate`  - Dry-run validation of a new or edited rule
/// - `GET    /redirects/{id}`      - Fetch a rule
/// - `PATCH  /redirects/{id}`      - Partially update a rule
/// - `DELETE /redirects/{id}`      - Delete a rule
/// - `POST   /cache/rebuild`       - Drop the shared table and rebuild
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/redirects",
            get(redirect_list_handler).post(create_redirect_handler),
        )
        .route("/redirects/validate", post(validate_redirect_handler))
        .route(
            "/redirects/{id}",
            get(get_redirect_handler)
                .patch(update_redirect_handler)
                .delete(delete_redirect_handler),
        )
        .route("/cache/rebuild", post(rebuild_cache_handler))
}
