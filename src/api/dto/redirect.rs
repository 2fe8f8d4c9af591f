//! DTOs for redirect rule management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use validator::Validate;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::application::services::{DryRun, RedirectSummary};
use crate::domain::entities::{
    EndpointChange, NodeId, RedirectType, RuleChanges, RuleDraft,
};
use crate::domain::resolution::Finding;

/// Request body for `POST /api/redirects`.
///
/// Each side takes a literal path (or absolute URL for the target) and/or a
/// content node id. When both are given and the node exists, the node wins.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateRedirectRequest {
    #[validate(length(max = 2560, message = "Path is too long"))]
    pub from_path: Option<String>,
    pub from_node_id: Option<i64>,

    #[validate(length(max = 2560, message = "Path is too long"))]
    pub to_path: Option<String>,
    pub to_node_id: Option<i64>,

    pub redirect_type: Option<RedirectType>,
}

impl From<CreateRedirectRequest> for RuleChanges {
    fn from(req: CreateRedirectRequest) -> Self {
        RuleChanges {
            from: EndpointChange {
                path: req.from_path,
                node: req.from_node_id.map(|id| Some(NodeId(id))),
            },
            to: EndpointChange {
                path: req.to_path,
                node: req.to_node_id.map(|id| Some(NodeId(id))),
            },
            redirect_type: req.redirect_type,
        }
    }
}

/// Request body for `PATCH /api/redirects/{id}` and the validation endpoint.
///
/// # Node field semantics
///
/// - **Absent** → leave the binding unchanged
/// - **`null`** → remove the binding
/// - **Id** → bind to that node
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRedirectRequest {
    #[validate(length(max = 2560, message = "Path is too long"))]
    pub from_path: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub from_node_id: Option<Option<i64>>,

    #[validate(length(max = 2560, message = "Path is too long"))]
    pub to_path: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub to_node_id: Option<Option<i64>>,

    pub redirect_type: Option<RedirectType>,
}

impl From<UpdateRedirectRequest> for RuleChanges {
    fn from(req: UpdateRedirectRequest) -> Self {
        RuleChanges {
            from: EndpointChange {
                path: req.from_path,
                node: req.from_node_id.map(|node| node.map(NodeId)),
            },
            to: EndpointChange {
                path: req.to_path,
                node: req.to_node_id.map(|node| node.map(NodeId)),
            },
            redirect_type: req.redirect_type,
        }
    }
}

/// Query parameters for `POST /api/redirects/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// Validate as an update of this rule instead of as a new rule.
    pub id: Option<i64>,
}

/// Query parameters for `GET /api/redirects`.
#[derive(Debug, Deserialize)]
pub struct RedirectListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    pub from: Option<String>,
    pub to: Option<String>,

    #[serde(rename = "type")]
    pub redirect_type: Option<String>,
}

/// A rule as returned by the management API.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub id: i64,
    pub from_path: String,
    pub from_node_id: Option<i64>,
    pub to_path: String,
    pub to_node_id: Option<i64>,
    pub redirect_type: RedirectType,
    /// Path requests are matched against, `null` if the source is unusable.
    pub from_link: Option<String>,
    /// Where matching requests are sent, `null` if the target is unusable.
    pub to_link: Option<String>,
    pub status_code: u16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RedirectSummary> for RedirectResponse {
    fn from(summary: RedirectSummary) -> Self {
        let rule = summary.rule;
        Self {
            id: rule.id.0,
            from_path: rule.from.path,
            from_node_id: rule.from.node.map(|n| n.0),
            to_path: rule.to.path,
            to_node_id: rule.to.node.map(|n| n.0),
            redirect_type: rule.redirect_type,
            from_link: summary.from_link,
            to_link: summary.to_link,
            status_code: summary.status_code,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

/// Paginated list of rules.
#[derive(Debug, Serialize)]
pub struct RedirectListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<RedirectResponse>,
}

/// The draft after normalization, as it would be stored.
#[derive(Debug, Serialize)]
pub struct NormalizedRule {
    pub id: Option<i64>,
    pub from_path: String,
    pub from_node_id: Option<i64>,
    pub to_path: String,
    pub to_node_id: Option<i64>,
    pub redirect_type: RedirectType,
}

impl From<RuleDraft> for NormalizedRule {
    fn from(draft: RuleDraft) -> Self {
        Self {
            id: draft.id.map(|id| id.0),
            from_path: draft.from.path,
            from_node_id: draft.from.node.map(|n| n.0),
            to_path: draft.to.path,
            to_node_id: draft.to.node.map(|n| n.0),
            redirect_type: draft.redirect_type,
        }
    }
}

/// Response of the dry-run validation endpoint.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub findings: Vec<Finding>,
    pub normalized: NormalizedRule,
}

impl From<DryRun> for ValidationResponse {
    fn from(dry_run: DryRun) -> Self {
        Self {
            valid: dry_run.result.is_valid(),
            findings: dry_run.result.findings,
            normalized: dry_run.draft.into(),
        }
    }
}

/// Response of `POST /api/cache/rebuild`.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub entries: usize,
    pub built_at: Option<DateTime<Utc>>,
}
