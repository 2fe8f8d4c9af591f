//! Handlers for redirect rule management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::warn;
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::api::dto::redirect::{
    CreateRedirectRequest, RebuildResponse, RedirectListQuery, RedirectListResponse,
    RedirectResponse, UpdateRedirectRequest, ValidateQuery, ValidationResponse,
};
use crate::domain::entities::{RedirectType, RuleId};
use crate::domain::repositories::RuleFilter;
use crate::error::AppError;
use crate::state::AppState;

/// Lists redirect rules with optional filters.
///
/// # Endpoint
///
/// `GET /api/redirects`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, range: 10-1000)
/// - `from` (optional): Substring of the stored source path
/// - `to` (optional): Substring of the stored target path or URL
/// - `type` (optional): `Permanent` or `Vanity`
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters or `type` are invalid.
pub async fn redirect_list_handler(
    State(state): State<AppState>,
    Query(params): Query<RedirectListQuery>,
) -> Result<Json<RedirectListResponse>, AppError> {
    let (_, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let redirect_type = params
        .redirect_type
        .as_deref()
        .map(|value| {
            RedirectType::parse(value).ok_or_else(|| {
                AppError::bad_request(
                    "Unknown redirect type",
                    json!({ "type": value, "allowed": ["Permanent", "Vanity"] }),
                )
            })
        })
        .transpose()?;

    let filter = RuleFilter {
        from: params.from,
        to: params.to,
        redirect_type,
    };

    let page = params.pagination.page();
    let (summaries, total_items) = state
        .redirect_service
        .list(&filter, page as i64, limit)
        .await?;

    Ok(Json(RedirectListResponse {
        pagination: PaginationMeta::new(page, params.pagination.page_size(), total_items),
        items: summaries.into_iter().map(RedirectResponse::from).collect(),
    }))
}

/// Creates a redirect rule.
///
/// # Endpoint
///
/// `POST /api/redirects`
///
/// # Request Body
///
/// ```json
/// {
///   "from_path": "/old-page/",
///   "to_node_id": 1042,
///   "redirect_type": "Permanent"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 with every validation finding if the rule is rejected,
/// including duplicates (with an `href` to the conflicting rule).
/// Returns 409 if a concurrent writer took the same source first.
pub async fn create_redirect_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRedirectRequest>,
) -> Result<(StatusCode, Json<RedirectResponse>), AppError> {
    payload.validate()?;

    let summary = state.redirect_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(summary.into())))
}

/// Fetches a single rule.
///
/// # Endpoint
///
/// `GET /api/redirects/{id}`
pub async fn get_redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RedirectResponse>, AppError> {
    let summary = state.redirect_service.get(RuleId(id)).await?;

    Ok(Json(summary.into()))
}

/// Partially updates a rule.
///
/// # Endpoint
///
/// `PATCH /api/redirects/{id}`
///
/// Omitted fields keep their stored value. Setting a node on a side
/// replaces its literal path and setting a path clears its node.
///
/// # Errors
///
/// Returns 404 if the rule does not exist.
/// Returns 400 with findings if the updated rule is rejected.
pub async fn update_redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRedirectRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    payload.validate()?;

    let summary = state
        .redirect_service
        .update(RuleId(id), payload.into())
        .await?;

    Ok(Json(summary.into()))
}

/// Deletes a rule.
///
/// # Endpoint
///
/// `DELETE /api/redirects/{id}`
///
/// # Errors
///
/// Returns 404 if the rule does not exist.
pub async fn delete_redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.redirect_service.delete(RuleId(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Dry-runs validation without committing.
///
/// # Endpoint
///
/// `POST /api/redirects/validate[?id={id}]`
///
/// With `id`, the body is applied on top of that rule as a PATCH would be.
/// Always 200 for a well-formed request; `valid` tells whether the rule
/// would be accepted.
pub async fn validate_redirect_handler(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
    Json(payload): Json<UpdateRedirectRequest>,
) -> Result<Json<ValidationResponse>, AppError> {
    payload.validate()?;

    let dry_run = state
        .redirect_service
        .validate(query.id.map(RuleId), payload.into())
        .await?;

    Ok(Json(dry_run.into()))
}

/// Drops the shared table and rebuilds it from the database.
///
/// # Endpoint
///
/// `POST /api/cache/rebuild`
///
/// # Errors
///
/// Returns 500 if the rules could not be loaded; the previous table keeps
/// serving and is reported stale by `/health`.
pub async fn rebuild_cache_handler(
    State(state): State<AppState>,
) -> Result<Json<RebuildResponse>, AppError> {
    let table = state.redirect_service.rebuild_cache().await.map_err(|e| {
        warn!(error = %e, "Forced rebuild failed");
        AppError::internal("Failed to rebuild redirect table", json!({}))
    })?;

    Ok(Json(RebuildResponse {
        entries: table.len(),
        built_at: table.built_at(),
    }))
}
