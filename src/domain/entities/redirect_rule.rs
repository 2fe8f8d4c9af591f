//! Redirect rule entity and its mutation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::content_node::{NodeId, NodeSnapshot};

/// Identifier of a persisted redirect rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub i64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of redirect, which decides the emitted HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RedirectType {
    /// `301 Moved Permanently`.
    #[default]
    Permanent,
    /// `302 Found`, for marketing and short vanity URLs.
    Vanity,
}

impl RedirectType {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "Permanent",
            Self::Vanity => "Vanity",
        }
    }

    /// Parses a stored value case-insensitively.
    ///
    /// Returns `None` for anything that is not a known redirect type.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("permanent") {
            Some(Self::Permanent)
        } else if value.eq_ignore_ascii_case("vanity") {
            Some(Self::Vanity)
        } else {
            None
        }
    }

    /// Parses a stored value, falling back to [`RedirectType::Permanent`].
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// HTTP status code emitted for this redirect type.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Permanent => 301,
            Self::Vanity => 302,
        }
    }
}

impl fmt::Display for RedirectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a rule an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    From,
    To,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => f.write_str("from"),
            Self::To => f.write_str("to"),
        }
    }
}

/// One end of a redirect: a literal path or a bound content node.
///
/// An empty `path` means "not set". Only one of the two selectors is active
/// at a time, see [`LinkEndpoint::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkEndpoint {
    pub path: String,
    pub node: Option<NodeId>,
}

impl LinkEndpoint {
    /// Endpoint selected by a literal path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            node: None,
        }
    }

    /// Endpoint bound to a content node.
    pub fn node(id: NodeId) -> Self {
        Self {
            path: String::new(),
            node: Some(id),
        }
    }

    /// Applies a change and enforces selector exclusivity.
    ///
    /// A newly bound node that exists clears the literal path. A newly set,
    /// non-empty literal path clears the node binding. The node rule runs
    /// first, so when both change at once and the node exists, the node wins.
    pub fn apply(&mut self, change: EndpointChange, nodes: &NodeSnapshot) {
        let node_changed = change.node.is_some_and(|node| node != self.node);
        let path_changed = change.path.as_ref().is_some_and(|path| *path != self.path);

        if let Some(node) = change.node {
            self.node = node;
        }
        if let Some(path) = change.path {
            self.path = path;
        }

        if node_changed && self.node.is_some_and(|id| nodes.exists(id)) {
            self.path.clear();
        }

        if path_changed && !self.path.is_empty() {
            self.node = None;
        }
    }
}

/// A committed redirect rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub id: RuleId,
    pub from: LinkEndpoint,
    pub to: LinkEndpoint,
    pub redirect_type: RedirectType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedirectRule {
    /// Creates a new RedirectRule instance.
    pub fn new(
        id: RuleId,
        from: LinkEndpoint,
        to: LinkEndpoint,
        redirect_type: RedirectType,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            redirect_type,
            created_at,
            updated_at,
        }
    }

    pub fn endpoint(&self, side: Side) -> &LinkEndpoint {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }
}

/// A rule that has not been validated yet.
///
/// Drafts are built either from scratch for creation or from a committed
/// rule for an update. `id` is `None` until the rule has been persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    pub id: Option<RuleId>,
    pub from: LinkEndpoint,
    pub to: LinkEndpoint,
    pub redirect_type: RedirectType,
}

impl RuleDraft {
    /// Empty draft for a new rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft carrying the current state of a committed rule.
    pub fn from_rule(rule: &RedirectRule) -> Self {
        Self {
            id: Some(rule.id),
            from: rule.from.clone(),
            to: rule.to.clone(),
            redirect_type: rule.redirect_type,
        }
    }

    pub fn endpoint(&self, side: Side) -> &LinkEndpoint {
        match side {
            Side::From => &self.from,
            Side::To => &self.to,
        }
    }

    /// Applies a set of changes, enforcing exclusivity on both sides.
    pub fn apply(&mut self, changes: RuleChanges, nodes: &NodeSnapshot) {
        self.from.apply(changes.from, nodes);
        self.to.apply(changes.to, nodes);
        if let Some(redirect_type) = changes.redirect_type {
            self.redirect_type = redirect_type;
        }
    }
}

/// Requested change to one endpoint.
///
/// `None` leaves a field unchanged. `node: Some(None)` removes the binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointChange {
    pub path: Option<String>,
    pub node: Option<Option<NodeId>>,
}

/// Partial update of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleChanges {
    pub from: EndpointChange,
    pub to: EndpointChange,
    pub redirect_type: Option<RedirectType>,
}

impl RuleChanges {
    /// Node ids this change set binds to, for prefetching the lookup snapshot.
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        [self.from.node, self.to.node]
            .into_iter()
            .flatten()
            .flatten()
            .collect()
    }
}
