//! Collision detection between redirect sources.

use crate::domain::entities::{LinkEndpoint, NodeId, RedirectRule, RuleDraft, RuleId};
use crate::utils::path_normalizer::lookup_key;

/// Comparison key for the source of a rule.
///
/// Node-bound sources compare by node id, literal sources by normalized path.
/// Keys of different modes never compare equal, so a literal `/foo/` does not
/// collide with a node that currently resolves to `/foo/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DuplicateKey {
    Node(NodeId),
    Literal(String),
}

impl DuplicateKey {
    /// Computes the key for a source endpoint.
    ///
    /// A set node binding selects node mode even if the node no longer
    /// exists.
    pub fn of(endpoint: &LinkEndpoint) -> Self {
        match endpoint.node {
            Some(id) => Self::Node(id),
            None => Self::Literal(lookup_key(&endpoint.path)),
        }
    }
}

/// Finds a committed rule whose source collides with the candidate's.
///
/// The candidate's own id is skipped so that re-saving a rule unchanged is
/// not reported. Returns the first conflicting id in `existing` order.
pub fn find_conflict(candidate: &RuleDraft, existing: &[RedirectRule]) -> Option<RuleId> {
    let key = DuplicateKey::of(&candidate.from);

    existing
        .iter()
        .filter(|rule| Some(rule.id) != candidate.id)
        .find(|rule| DuplicateKey::of(&rule.from) == key)
        .map(|rule| rule.id)
}
