//! `GET /health` response body.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Ok,
    Error,
    /// The redirect table was never built or its last rebuild failed.
    Stale,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: OverallStatus,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub cache: CheckStatus,
    pub redirect_table: TableStatus,
}

impl HealthChecks {
    pub fn all_ok(&self) -> bool {
        [
            self.database.status,
            self.cache.status,
            self.redirect_table.status,
        ]
        .iter()
        .all(|s| *s == ComponentState::Ok)
    }
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ComponentState::Ok,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ComponentState::Error,
            message: Some(message.into()),
        }
    }
}

/// Snapshot of the in-process lookup table.
#[derive(Debug, Serialize)]
pub struct TableStatus {
    pub status: ComponentState,
    pub entries: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub stale: bool,
}
