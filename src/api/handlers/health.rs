//! Liveness and readiness endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{
    CheckStatus, ComponentState, HealthChecks, HealthResponse, OverallStatus, TableStatus,
};
use crate::state::AppState;

/// `GET /health`
///
/// Answers `200` when PostgreSQL answers `SELECT 1`, the shared cache answers
/// `PING` (always true without Redis) and the redirect table is fresh.
/// Otherwise `503` with the same body, so load balancers can hold traffic
/// until the first table build succeeds.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "Cache reachable" },
///     "redirect_table": {
///       "status": "ok", "entries": 42,
///       "built_at": "2026-01-01T00:00:00Z", "stale": false
///     }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let checks = HealthChecks {
        database: check_database(&state).await,
        cache: check_cache(&state).await,
        redirect_table: check_table(&state),
    };

    let (code, status) = if checks.all_ok() {
        (StatusCode::OK, OverallStatus::Healthy)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, OverallStatus::Degraded)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}

async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query("SELECT 1").execute(state.db.as_ref()).await {
        Ok(_) => CheckStatus::ok("Connected"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            CheckStatus::error(format!("Database error: {e}"))
        }
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.table_cache.health_check().await {
        CheckStatus::ok("Cache reachable")
    } else {
        CheckStatus::error("Redis connection failed")
    }
}

fn check_table(state: &AppState) -> TableStatus {
    let table = state.resolution_cache.status();

    TableStatus {
        status: if table.stale {
            ComponentState::Stale
        } else {
            ComponentState::Ok
        },
        entries: table.entries,
        built_at: table.built_at,
        stale: table.stale,
    }
}
