//! Application error type and its HTTP representation.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::resolution::{Finding, ValidationResult};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    Forbidden { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::Validation { message, details }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::NotFound { message, details }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::Conflict { message, details }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::Unauthorized { message, details }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::Forbidden { message, details }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        let message = message.into();
        Self::Internal { message, details }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable `error.code` in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Internal { .. } => "internal_error",
        }
    }

    fn into_parts(self) -> (String, Value) {
        match self {
            Self::Validation { message, details }
            | Self::NotFound { message, details }
            | Self::Conflict { message, details }
            | Self::Unauthorized { message, details }
            | Self::Forbidden { message, details }
            | Self::Internal { message, details } => (message, details),
        }
    }

    /// Wraps a failed validation, keeping every finding in `details`.
    ///
    /// Duplicate findings gain an `href` pointing at the conflicting rule so
    /// clients can offer to edit it instead.
    pub fn rejected(result: &ValidationResult) -> Self {
        let findings: Vec<Value> = result
            .findings
            .iter()
            .map(|finding| {
                let mut value = serde_json::to_value(finding).unwrap_or(Value::Null);
                if let (Finding::DuplicateRedirect { conflicting_id }, Value::Object(map)) =
                    (finding, &mut value)
                {
                    map.insert(
                        "href".to_string(),
                        json!(format!("/api/redirects/{}", conflicting_id)),
                    );
                }
                value
            })
            .collect();

        let message = if result.conflicting_rule().is_some() {
            "A redirect for this URL already exists"
        } else {
            "Redirect rule is invalid"
        };

        Self::bad_request(message, json!({ "findings": findings }))
    }
}

/// Renders `{"error": {"code", "message", "details"}}`. A 401 also carries
/// `WWW-Authenticate: Bearer` (RFC 6750).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let (message, details) = self.into_parts();

        let body = Json(ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        });

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Invalid request", json!(e))
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal("Database error", json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RuleId, Side};

    #[test]
    fn test_rejected_includes_all_findings() {
        let result = ValidationResult {
            findings: vec![
                Finding::MalformedField {
                    side: Side::To,
                    reason: "missing".to_string(),
                },
                Finding::DuplicateRedirect {
                    conflicting_id: RuleId(12),
                },
            ],
        };

        let err = AppError::rejected(&result);

        let AppError::Validation { message, details } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "A redirect for this URL already exists");

        let findings = details["findings"].as_array().unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0]["kind"], "malformed_field");
        assert_eq!(findings[0]["side"], "to");
        assert_eq!(findings[1]["conflicting_id"], 12);
        assert_eq!(findings[1]["href"], "/api/redirects/12");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::bad_request("x", json!({})), StatusCode::BAD_REQUEST),
            (AppError::not_found("x", json!({})), StatusCode::NOT_FOUND),
            (AppError::conflict("x", json!({})), StatusCode::CONFLICT),
            (AppError::unauthorized("x", json!({})), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x", json!({})), StatusCode::FORBIDDEN),
            (
                AppError::internal("x", json!({})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::unauthorized("Unauthorized", json!({})).into_response();

        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::not_found("Redirect rule not found", json!({ "id": 1 }));

        assert_eq!(err.to_string(), "Redirect rule not found");
    }
}
