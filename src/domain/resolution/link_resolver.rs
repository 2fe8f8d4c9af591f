//! Effective path resolution for redirect rules.

use tracing::debug;

use crate::domain::entities::{LinkEndpoint, NodeSnapshot, RedirectRule, RedirectType, Side};

/// Resolves the effective path of one side of a rule.
///
/// A bound node that currently exists wins and yields its relative link
/// re-rooted under a single `/`. Otherwise the literal path is used. `None`
/// means the side has nothing usable and is treated as "no match".
pub fn resolve_effective_path(
    rule: &RedirectRule,
    side: Side,
    nodes: &NodeSnapshot,
) -> Option<String> {
    resolve_endpoint(rule.endpoint(side), nodes)
}

/// Resolves an endpoint independent of the rule it belongs to.
///
/// Shared by committed rules and drafts under validation.
pub fn resolve_endpoint(endpoint: &LinkEndpoint, nodes: &NodeSnapshot) -> Option<String> {
    if let Some(id) = endpoint.node {
        match nodes.get(id) {
            Some(node) => {
                return Some(format!("/{}", node.relative_link.trim_start_matches('/')));
            }
            None => debug!(node_id = %id, "Content node is gone, falling back to literal path"),
        }
    }

    if endpoint.path.is_empty() {
        None
    } else {
        Some(endpoint.path.clone())
    }
}

/// HTTP status code for a rule.
pub fn status_code_for(rule: &RedirectRule) -> u16 {
    status_code_for_type(rule.redirect_type)
}

/// HTTP status code for a redirect type.
///
/// Stored values that are not a known type are parsed as
/// [`RedirectType::Permanent`] at the persistence boundary, so they end up
/// as 301 here.
pub fn status_code_for_type(redirect_type: RedirectType) -> u16 {
    redirect_type.status_code()
}
