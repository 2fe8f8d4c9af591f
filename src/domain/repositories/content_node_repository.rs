//! Lookup collaborator for CMS content nodes.

use crate::domain::entities::{ContentNode, NodeId, NodeSnapshot};
use crate::error::AppError;
use async_trait::async_trait;

/// Read-only access to content nodes.
///
/// Rules only reference nodes by id; this trait is how their current
/// existence and relative link are discovered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentNodeRepository: Send + Sync {
    /// Fetches the given nodes. Unknown ids are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_many(&self, ids: &[NodeId]) -> Result<Vec<ContentNode>, AppError>;
}

/// Fetches a [`NodeSnapshot`] covering `ids`, skipping the round trip when
/// there is nothing to look up.
pub async fn snapshot_of<N: ContentNodeRepository + ?Sized>(
    repo: &N,
    ids: &[NodeId],
) -> Result<NodeSnapshot, AppError> {
    if ids.is_empty() {
        return Ok(NodeSnapshot::new());
    }
    Ok(repo.find_many(ids).await?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_of_empty_ids_skips_lookup() {
        let mut repo = MockContentNodeRepository::new();
        repo.expect_find_many().never();

        let snapshot = snapshot_of(&repo, &[]).await.unwrap();

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_of_collects_nodes() {
        let mut repo = MockContentNodeRepository::new();
        repo.expect_find_many()
            .times(1)
            .returning(|_| Ok(vec![ContentNode::new(NodeId(4), true, "news/")]));

        let snapshot = snapshot_of(&repo, &[NodeId(4), NodeId(5)]).await.unwrap();

        assert!(snapshot.exists(NodeId(4)));
        assert!(!snapshot.exists(NodeId(5)));
    }
}
