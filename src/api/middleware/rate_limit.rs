//! Rate limiting middleware using token bucket algorithm.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Replenish rate and burst size of a per-IP token bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub per_second: u64,
    pub burst_size: u32,
}

/// Limits for the management API.
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub const SECURE: Quota = Quota {
    per_second: 1,
    burst_size: 10,
};

/// Applies a per-client-IP rate limit to every route of `router`.
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// With `behind_proxy` the client IP is read from `X-Forwarded-For`,
/// `X-Real-IP` or `Forwarded` before falling back to the peer address.
/// Otherwise only the socket peer address is used, so the server must be
/// served with `into_make_service_with_connect_info::<SocketAddr>`.
///
/// # Example
///
/// ```rust,ignore
/// let api = rate_limit::apply(
///     Router::new().route("/redirects", get(redirect_list_handler)),
///     rate_limit::SECURE,
///     config.behind_proxy,
/// );
/// ```
pub fn apply<S>(router: Router<S>, quota: Quota, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(governor_layer(SmartIpKeyExtractor, quota))
    } else {
        router.layer(governor_layer(PeerIpKeyExtractor, quota))
    }
}

fn governor_layer<K>(
    key_extractor: K,
    quota: Quota,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>
where
    K: KeyExtractor,
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(quota.per_second)
            .burst_size(quota.burst_size)
            .finish()
            .expect("rate limit quota must be non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
