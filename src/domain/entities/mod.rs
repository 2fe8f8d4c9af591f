//! Core domain entities representing the redirect data model.
//!
//! # Entity Types
//!
//! - [`RedirectRule`] - A committed From → To mapping
//! - [`RuleDraft`] - A rule being created or edited, before validation
//! - [`ContentNode`] - A page owned by the CMS, referenced weakly by rules
//! - [`ApiToken`] - A hashed credential for the management API
//!
//! # Design Pattern
//!
//! Mutations are expressed as [`RuleChanges`] and applied to a draft, which
//! enforces that each side is selected either by a literal path or by a node
//! binding, never both.

pub mod api_token;
pub mod content_node;
pub mod redirect_rule;

pub use api_token::{ApiToken, NewToken, Permission, TokenKey};
pub use content_node::{ContentNode, NodeId, NodeSnapshot};
pub use redirect_rule::{
    EndpointChange, LinkEndpoint, RedirectRule, RedirectType, RuleChanges, RuleDraft, RuleId,
    Side,
};
