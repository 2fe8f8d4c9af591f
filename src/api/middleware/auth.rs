//! Bearer token guard for the management API.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::entities::Permission;
use crate::{error::AppError, state::AppState};

/// Lets the request through only if its `Authorization: Bearer <token>`
/// names an unrevoked token carrying [`Permission::ManageRedirects`].
///
/// A missing, malformed, unknown or revoked token is `401` (with
/// `WWW-Authenticate: Bearer`); a valid token without the permission is `403`.
///
/// ```rust,ignore
/// Router::new()
///     .route("/redirects", get(list_redirects_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();
    let token = bearer_token(&mut parts).await?;

    state
        .auth_service
        .authorize(&token, Permission::ManageRedirects)
        .await?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn bearer_token(parts: &mut Parts) -> Result<String, AppError> {
    match AuthBearer::from_request_parts(parts, &()).await {
        Ok(AuthBearer(token)) if !token.is_empty() => Ok(token),
        _ => Err(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "Authorization header is missing or invalid" }),
        )),
    }
}
