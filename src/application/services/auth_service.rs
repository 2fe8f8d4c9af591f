//! Authentication and authorization of API tokens.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{ApiToken, Permission};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 48;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. Shared with the admin
/// CLI so tokens it creates verify against the server.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random 48-character alphanumeric token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Checks raw bearer tokens against their stored HMACs.
///
/// Hashes are keyed with a server-side secret, so a leaked `api_tokens`
/// table is not enough to forge a credential.
pub struct AuthService<R: TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository> AuthService<R> {
    /// `signing_secret` must be the one the tokens were hashed with.
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Resolves a raw token to its stored record and stamps `last_used_at`.
    /// A failed stamp is logged and does not reject the request.
    ///
    /// # Errors
    ///
    /// [`AppError::Unauthorized`] for unknown or revoked tokens,
    /// [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<ApiToken, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.touch(&token_hash).await {
            tracing::warn!(token = %api_token.name, error = %e, "Failed to record token use");
        }

        Ok(api_token)
    }

    /// Authenticates a token and checks it carries `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] as for [`AuthService::authenticate`].
    /// Returns [`AppError::Forbidden`] if the token lacks the permission.
    pub async fn authorize(&self, token: &str, permission: Permission) -> Result<ApiToken, AppError> {
        let api_token = self.authenticate(token).await?;

        if !api_token.has_permission(permission) {
            return Err(AppError::forbidden(
                "Forbidden",
                json!({ "required_permission": permission.as_str() }),
            ));
        }

        Ok(api_token)
    }
}
