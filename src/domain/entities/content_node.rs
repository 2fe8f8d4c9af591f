//! Content node entity supplied by the surrounding CMS.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a content node (a page in the CMS site tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A content node as seen through the lookup collaborator.
///
/// Rules hold only a weak [`NodeId`]; the node may be unpublished or removed
/// at any time without the rule being touched. `relative_link` is the node's
/// current link as reported by the CMS and may or may not carry a leading `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub id: NodeId,
    pub exists: bool,
    pub relative_link: String,
}

impl ContentNode {
    /// Creates a content node view.
    pub fn new(id: NodeId, exists: bool, relative_link: impl Into<String>) -> Self {
        Self {
            id,
            exists,
            relative_link: relative_link.into(),
        }
    }
}

/// Point-in-time view of the content nodes referenced by a set of rules.
///
/// Nodes missing from the snapshot are treated exactly like nodes that do not
/// exist.
#[derive(Debug, Clone, Default)]
pub struct NodeSnapshot {
    nodes: HashMap<NodeId, ContentNode>,
}

impl NodeSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node if it is known and currently exists.
    pub fn get(&self, id: NodeId) -> Option<&ContentNode> {
        self.nodes.get(&id).filter(|node| node.exists)
    }

    /// Returns true if the node is known and currently exists.
    pub fn exists(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<ContentNode> for NodeSnapshot {
    fn from_iter<I: IntoIterator<Item = ContentNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|node| (node.id, node)).collect(),
        }
    }
}
