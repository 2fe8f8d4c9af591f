//! Fallback handler that serves configured redirects.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::utils::path_normalizer::encode_location;

/// Redirects any request whose path matches a rule's source.
///
/// # Endpoint
///
/// Every path not claimed by another route.
///
/// # Request Flow
///
/// 1. Take the request path, ignoring the query string
/// 2. Look it up in the in-process redirect table (percent-decoded and
///    normalized, exact match)
/// 3. On hit, respond with the rule's status code and a `Location` header
///    holding the percent-encoded target
/// 4. On miss, respond `404 Not Found`
///
/// The lookup never touches the database or Redis, so a stale or failed
/// rebuild degrades to serving the last good table rather than erroring.
/// Targets are not followed: a rule pointing at another rule's source yields
/// a single hop.
pub async fn redirect_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();

    let Some(resolved) = state.resolution_cache.resolve(path) else {
        debug!(path, "No redirect configured");
        metrics::counter!("redirects_unmatched_total").increment(1);
        return StatusCode::NOT_FOUND.into_response();
    };

    let status = StatusCode::from_u16(resolved.status_code).unwrap_or(StatusCode::MOVED_PERMANENTLY);

    let Ok(location) = HeaderValue::from_str(&encode_location(&resolved.target_path)) else {
        warn!(
            path,
            rule_id = %resolved.rule_id,
            target = %resolved.target_path,
            "Redirect target is not a valid header value"
        );
        metrics::counter!("redirects_unmatched_total").increment(1);
        return StatusCode::NOT_FOUND.into_response();
    };

    debug!(path, rule_id = %resolved.rule_id, status = status.as_u16(), "Redirect HIT");
    metrics::counter!("redirects_resolved_total", "status" => status.as_str().to_owned())
        .increment(1);

    (status, [(header::LOCATION, location)]).into_response()
}
