//! PostgreSQL lookup of CMS content nodes.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ContentNode, NodeId};
use crate::domain::repositories::ContentNodeRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: i64,
    relative_link: String,
    is_live: bool,
}

/// Reads the `content_nodes` table maintained by the CMS.
///
/// Soft-deleted rows are returned with `exists = false` so that rules bound
/// to them fall back to their literal path.
pub struct PgContentNodeRepository {
    pool: Arc<PgPool>,
}

impl PgContentNodeRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentNodeRepository for PgContentNodeRepository {
    async fn find_many(&self, ids: &[NodeId]) -> Result<Vec<ContentNode>, AppError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, NodeRow>(
            r#"
            SELECT id, relative_link, (deleted_at IS NULL) AS is_live
            FROM content_nodes
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ContentNode::new(NodeId(r.id), r.is_live, r.relative_link))
            .collect())
    }
}
