//! Storage of hashed API tokens.

use crate::domain::entities::{ApiToken, NewToken, TokenKey};
use crate::error::AppError;
use async_trait::async_trait;

/// Token storage. Implemented by
/// [`crate::infrastructure::persistence::PgTokenRepository`].
///
/// All methods return [`AppError::Internal`] on database errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// The unrevoked token with this hash, if any.
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError>;

    /// Records that the token with this hash was just used.
    async fn touch(&self, token_hash: &str) -> Result<(), AppError>;

    /// Stores a new token.
    ///
    /// # Errors
    ///
    /// [`AppError::Conflict`] if the name or hash is already taken.
    async fn create(&self, token: NewToken) -> Result<ApiToken, AppError>;

    /// Every token including revoked ones, newest first.
    async fn list(&self) -> Result<Vec<ApiToken>, AppError>;

    async fn find(&self, key: &TokenKey) -> Result<Option<ApiToken>, AppError>;

    /// Returns `false` if the token was missing or already revoked.
    async fn revoke(&self, id: i64) -> Result<bool, AppError>;
}
