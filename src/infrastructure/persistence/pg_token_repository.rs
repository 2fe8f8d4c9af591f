//! PostgreSQL implementation of the token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ApiToken, NewToken, TokenKey};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

const COLUMNS: &str = "id, name, token_hash, permissions, created_at, last_used_at, revoked_at";

pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let token = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {COLUMNS} FROM api_tokens WHERE token_hash = $1 AND revoked_at IS NULL"
        ))
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(token)
    }

    async fn touch(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE api_tokens SET last_used_at = NOW() \
             WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create(&self, token: NewToken) -> Result<ApiToken, AppError> {
        let created = sqlx::query_as::<_, ApiToken>(&format!(
            r#"
            INSERT INTO api_tokens (name, token_hash, permissions)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&token.name)
        .bind(&token.token_hash)
        .bind(&token.permissions)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn list(&self) -> Result<Vec<ApiToken>, AppError> {
        let tokens = sqlx::query_as::<_, ApiToken>(&format!(
            "SELECT {COLUMNS} FROM api_tokens ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(tokens)
    }

    async fn find(&self, key: &TokenKey) -> Result<Option<ApiToken>, AppError> {
        let query = match key {
            TokenKey::Id(id) => sqlx::query_as::<_, ApiToken>(&format!(
                "SELECT {COLUMNS} FROM api_tokens WHERE id = $1"
            ))
            .bind(*id)
            .fetch_optional(self.pool.as_ref())
            .await,
            TokenKey::Name(name) => sqlx::query_as::<_, ApiToken>(&format!(
                "SELECT {COLUMNS} FROM api_tokens WHERE name = $1"
            ))
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await,
        };

        Ok(query?)
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE api_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
