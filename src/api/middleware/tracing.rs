//! HTTP request/response tracing middleware.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

type MakeSpan = fn(&Request<axum::body::Body>) -> Span;

/// Creates a tracing middleware for HTTP requests.
///
/// **On Request:** opens an `INFO` span with the method and path. The query
/// string is left out: redirect sources ignore it and it often carries
/// tracking parameters.
///
/// **On Response:** logs status and latency in milliseconds at `INFO`.
///
/// **On Failure:** 5xx responses are additionally logged at `WARN`.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET path=/old-page/}: finished processing request latency=0 ms status=301
/// INFO request{method=POST path=/api/redirects}: finished processing request latency=14 ms status=201
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpan> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::WARN)
                .latency_unit(LatencyUnit::Millis),
        )
}

fn make_span(request: &Request<axum::body::Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}
