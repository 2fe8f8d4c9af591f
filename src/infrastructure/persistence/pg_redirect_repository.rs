//! PostgreSQL implementation of the redirect repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LinkEndpoint, NodeId, RedirectRule, RedirectType, RuleId};
use crate::domain::repositories::{RedirectRepository, RuleFilter};
use crate::domain::resolution::ValidatedRule;
use crate::error::AppError;

const COLUMNS: &str = "id, from_path, from_node_id, to_path, to_node_id, redirect_type, \
                       created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RedirectRow {
    id: i64,
    from_path: String,
    from_node_id: Option<i64>,
    to_path: String,
    to_node_id: Option<i64>,
    redirect_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RedirectRow> for RedirectRule {
    fn from(row: RedirectRow) -> Self {
        RedirectRule::new(
            RuleId(row.id),
            LinkEndpoint {
                path: row.from_path,
                node: row.from_node_id.map(NodeId),
            },
            LinkEndpoint {
                path: row.to_path,
                node: row.to_node_id.map(NodeId),
            },
            RedirectType::parse_or_default(&row.redirect_type),
            row.created_at,
            row.updated_at,
        )
    }
}

/// Substring pattern for `ILIKE ... ESCAPE '\'` that matches `term` literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL repository for redirect rules.
///
/// The partial unique indexes on `from_path` and `from_node_id` back up the
/// in-process duplicate check when several processes write concurrently.
pub struct PgRedirectRepository {
    pool: Arc<PgPool>,
}

impl PgRedirectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedirectRepository for PgRedirectRepository {
    async fn load_all(&self) -> Result<Vec<RedirectRule>, AppError> {
        let rows = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {COLUMNS} FROM redirect_rules ORDER BY id"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(RedirectRule::from).collect())
    }

    async fn find_by_id(&self, id: RuleId) -> Result<Option<RedirectRule>, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(&format!(
            "SELECT {COLUMNS} FROM redirect_rules WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(RedirectRule::from))
    }

    async fn list(
        &self,
        filter: &RuleFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RedirectRule>, AppError> {
        let rows = sqlx::query_as::<_, RedirectRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM redirect_rules
            WHERE ($1::text IS NULL OR from_path ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR to_path ILIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR redirect_type = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.from.as_deref().map(like_pattern))
        .bind(filter.to.as_deref().map(like_pattern))
        .bind(filter.redirect_type.map(|t| t.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(RedirectRule::from).collect())
    }

    async fn count(&self, filter: &RuleFilter) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM redirect_rules
            WHERE ($1::text IS NULL OR from_path ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR to_path ILIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR redirect_type = $3)
            "#,
        )
        .bind(filter.from.as_deref().map(like_pattern))
        .bind(filter.to.as_deref().map(like_pattern))
        .bind(filter.redirect_type.map(|t| t.as_str()))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn commit(&self, rule: ValidatedRule) -> Result<RedirectRule, AppError> {
        let draft = rule.into_draft();

        let query = match draft.id {
            None => format!(
                r#"
                INSERT INTO redirect_rules
                    (from_path, from_node_id, to_path, to_node_id, redirect_type)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {COLUMNS}
                "#
            ),
            Some(_) => format!(
                r#"
                UPDATE redirect_rules
                SET from_path = $1,
                    from_node_id = $2,
                    to_path = $3,
                    to_node_id = $4,
                    redirect_type = $5,
                    updated_at = NOW()
                WHERE id = $6
                RETURNING {COLUMNS}
                "#
            ),
        };

        let mut statement = sqlx::query_as::<_, RedirectRow>(&query)
            .bind(&draft.from.path)
            .bind(draft.from.node.map(|n| n.0))
            .bind(&draft.to.path)
            .bind(draft.to.node.map(|n| n.0))
            .bind(draft.redirect_type.as_str());

        if let Some(id) = draft.id {
            statement = statement.bind(id.0);
        }

        let row = statement.fetch_optional(self.pool.as_ref()).await?;

        match (row, draft.id) {
            (Some(row), _) => Ok(row.into()),
            (None, Some(id)) => Err(AppError::not_found(
                "Redirect rule not found",
                json!({ "id": id }),
            )),
            (None, None) => Err(AppError::internal(
                "Insert returned no row",
                json!({}),
            )),
        }
    }

    async fn delete(&self, id: RuleId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM redirect_rules WHERE id = $1")
            .bind(id.0)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_plain_terms() {
        assert_eq!(like_pattern("blog"), "%blog%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("_"), r"%\_%");
        assert_eq!(like_pattern("50%"), r"%50\%%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
