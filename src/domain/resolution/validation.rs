//! Validation pipeline run on every rule create and update.
//!
//! All checks run and accumulate into a [`ValidationResult`]; nothing
//! short-circuits, so a rule that is both malformed and a duplicate reports
//! both problems at once. Only a clean result can be turned into a
//! [`ValidatedRule`], which is the sole input persistence accepts.

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use url::Url;

use super::duplicate_detector::find_conflict;
use super::link_resolver::resolve_endpoint;
use crate::domain::entities::{LinkEndpoint, NodeSnapshot, RedirectRule, RuleDraft, RuleId, Side};
use crate::utils::path_normalizer::{is_external, normalize_path};

/// Longest literal path accepted, matching the storage column width.
pub const MAX_PATH_LEN: usize = 2560;

static LOCAL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:[^\s?#]*/)?$").expect("static regex is valid"));

/// A single problem found while validating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// A side is neither a usable literal path/URL nor an existing node.
    MalformedField { side: Side, reason: String },
    /// Another committed rule already owns the same source.
    DuplicateRedirect { conflicting_id: RuleId },
    /// The optional destination probe rejected the target.
    UnreachableDestination { target: String, reason: String },
}

impl Finding {
    /// Whether the finding prevents the rule from being committed.
    pub fn is_blocking(&self) -> bool {
        match self {
            Self::MalformedField { .. }
            | Self::DuplicateRedirect { .. }
            | Self::UnreachableDestination { .. } => true,
        }
    }

    fn malformed(side: Side, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            side,
            reason: reason.into(),
        }
    }
}

/// Aggregated outcome of [`ValidationPipeline::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
}

impl ValidationResult {
    /// True when no blocking finding was recorded.
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(Finding::is_blocking)
    }

    /// Id of the rule this one collides with, if any.
    pub fn conflicting_rule(&self) -> Option<RuleId> {
        self.findings.iter().find_map(|finding| match finding {
            Finding::DuplicateRedirect { conflicting_id } => Some(*conflicting_id),
            _ => None,
        })
    }

    /// Promotes a draft to a [`ValidatedRule`] if this result allows it.
    ///
    /// # Errors
    ///
    /// Returns the result itself when it contains a blocking finding.
    pub fn into_validated(self, draft: RuleDraft) -> Result<ValidatedRule, ValidationResult> {
        if self.is_valid() {
            Ok(ValidatedRule(draft))
        } else {
            Err(self)
        }
    }
}

/// A draft that passed validation and may be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRule(RuleDraft);

impl ValidatedRule {
    pub fn draft(&self) -> &RuleDraft {
        &self.0
    }

    pub fn into_draft(self) -> RuleDraft {
        self.0
    }
}

/// Optional reachability check for redirect targets.
///
/// No implementation ships with the service; deployments that want one
/// inject it via [`ValidationPipeline::with_probe`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DestinationProbe: Send + Sync {
    /// Checks a resolved target path or URL.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the target is not reachable.
    async fn check(&self, target: &str) -> Result<(), String>;
}

/// Normalizes and validates rule drafts.
#[derive(Clone, Default)]
pub struct ValidationPipeline {
    probe: Option<Arc<dyn DestinationProbe>>,
}

impl ValidationPipeline {
    /// Creates a pipeline without a destination probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline that also probes resolved destinations.
    pub fn with_probe(probe: Arc<dyn DestinationProbe>) -> Self {
        Self { probe: Some(probe) }
    }

    /// Validates a draft against the committed rule set.
    ///
    /// # Steps
    ///
    /// 1. Normalize `from.path` and `to.path` in place
    /// 2. Check each side for a usable path, URL or node
    /// 3. Look for a committed rule with the same source
    /// 4. Probe the destination, if a probe is configured and the target side
    ///    is well formed
    ///
    /// `existing` must be a consistent snapshot of committed rules.
    pub async fn validate(
        &self,
        draft: &mut RuleDraft,
        existing: &[RedirectRule],
        nodes: &NodeSnapshot,
    ) -> ValidationResult {
        draft.from.path = normalize_path(&draft.from.path);
        draft.to.path = normalize_path(&draft.to.path);

        let mut findings = Vec::new();

        check_endpoint(Side::From, &draft.from, nodes, &mut findings);
        let target_ok = check_endpoint(Side::To, &draft.to, nodes, &mut findings);

        if let Some(conflicting_id) = find_conflict(draft, existing) {
            findings.push(Finding::DuplicateRedirect { conflicting_id });
        }

        if target_ok
            && let Some(probe) = &self.probe
            && let Some(target) = resolve_endpoint(&draft.to, nodes)
            && let Err(reason) = probe.check(&target).await
        {
            findings.push(Finding::UnreachableDestination { target, reason });
        }

        ValidationResult { findings }
    }
}

/// Records problems with one side and returns whether it is usable.
fn check_endpoint(
    side: Side,
    endpoint: &LinkEndpoint,
    nodes: &NodeSnapshot,
    findings: &mut Vec<Finding>,
) -> bool {
    if endpoint.node.is_some_and(|id| nodes.exists(id)) {
        return true;
    }

    if endpoint.path.is_empty() {
        let reason = match endpoint.node {
            Some(id) => format!("references content node {} which no longer exists", id),
            None => "missing: provide a path or a content node".to_string(),
        };
        findings.push(Finding::malformed(side, reason));
        return false;
    }

    match check_literal(side, &endpoint.path) {
        Ok(()) => true,
        Err(reason) => {
            findings.push(Finding::malformed(side, reason));
            false
        }
    }
}

/// Checks an already normalized literal path or URL.
fn check_literal(side: Side, path: &str) -> Result<(), String> {
    if path.chars().count() > MAX_PATH_LEN {
        return Err(format!("longer than {} characters", MAX_PATH_LEN));
    }

    if !is_external(path) {
        return if LOCAL_PATH.is_match(path) {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid local path", path))
        };
    }

    if side == Side::From {
        return Err("source must be a local path, not an absolute URL".to_string());
    }

    let url = Url::parse(path).map_err(|e| format!("'{}' is not a valid URL: {}", path, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported URL scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ContentNode, NodeId, RedirectType};
    use chrono::Utc;

    fn nodes() -> NodeSnapshot {
        vec![
            ContentNode::new(NodeId(1), true, "about-us/"),
            ContentNode::new(NodeId(2), false, "gone/"),
        ]
        .into_iter()
        .collect()
    }

    fn draft(from: LinkEndpoint, to: LinkEndpoint) -> RuleDraft {
        RuleDraft {
            id: None,
            from,
            to,
            redirect_type: RedirectType::Permanent,
        }
    }

    fn committed(id: i64, from: &str) -> RedirectRule {
        let now = Utc::now();
        RedirectRule::new(
            RuleId(id),
            LinkEndpoint::path(from),
            LinkEndpoint::path("/somewhere/"),
            RedirectType::Permanent,
            now,
            now,
        )
    }

    #[tokio::test]
    async fn test_valid_rule_is_normalized() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("old page"), LinkEndpoint::path("new"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid());
        assert!(result.findings.is_empty());
        assert_eq!(candidate.from.path, "/oldpage/");
        assert_eq!(candidate.to.path, "/new/");
    }

    #[tokio::test]
    async fn test_root_path_is_valid_target() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("/old/"), LinkEndpoint::path("/"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid(), "{:?}", result.findings);
        assert_eq!(candidate.to.path, "/");
    }

    #[tokio::test]
    async fn test_root_path_is_valid_source() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("  "), LinkEndpoint::path("/home/"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid(), "{:?}", result.findings);
        assert_eq!(candidate.from.path, "/");
    }

    #[tokio::test]
    async fn test_external_target_is_kept() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(
            LinkEndpoint::path("/go/"),
            LinkEndpoint::path("https://example.com/Landing Page"),
        );

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid(), "{:?}", result);
        assert_eq!(candidate.to.path, "https://example.com/Landing Page");
    }

    #[tokio::test]
    async fn test_node_bound_sides_are_valid() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("/promo/"), LinkEndpoint::node(NodeId(1)));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_missing_sides_are_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::default(), LinkEndpoint::default());

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
        assert!(result.findings.contains(&Finding::MalformedField {
            side: Side::From,
            reason: "missing: provide a path or a content node".to_string(),
        }));
        assert!(
            result
                .findings
                .iter()
                .any(|f| matches!(f, Finding::MalformedField { side: Side::To, .. }))
        );
    }

    #[tokio::test]
    async fn test_vanished_node_is_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::node(NodeId(2)));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert_eq!(
            result.findings,
            vec![Finding::MalformedField {
                side: Side::To,
                reason: "references content node 2 which no longer exists".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_external_source_is_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(
            LinkEndpoint::path("https://example.com/x"),
            LinkEndpoint::path("/b/"),
        );

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(
            result
                .findings
                .iter()
                .any(|f| matches!(f, Finding::MalformedField { side: Side::From, .. }))
        );
    }

    #[tokio::test]
    async fn test_bad_external_target_is_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::path("httpfoo"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn test_query_in_local_path_is_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(LinkEndpoint::path("/a?b=1"), LinkEndpoint::path("/b/"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn test_overlong_path_is_malformed() {
        let pipeline = ValidationPipeline::new();
        let mut candidate = draft(
            LinkEndpoint::path("a".repeat(MAX_PATH_LEN)),
            LinkEndpoint::path("/b/"),
        );

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn test_duplicate_is_reported() {
        let pipeline = ValidationPipeline::new();
        let existing = vec![committed(5, "/taken/")];
        let mut candidate = draft(LinkEndpoint::path("taken"), LinkEndpoint::path("/x/"));

        let result = pipeline.validate(&mut candidate, &existing, &nodes()).await;

        assert!(!result.is_valid());
        assert_eq!(result.conflicting_rule(), Some(RuleId(5)));
    }

    #[tokio::test]
    async fn test_findings_accumulate() {
        let pipeline = ValidationPipeline::new();
        let existing = vec![committed(5, "/taken/")];
        let mut candidate = draft(LinkEndpoint::path("/taken/"), LinkEndpoint::default());

        let result = pipeline.validate(&mut candidate, &existing, &nodes()).await;

        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.conflicting_rule(), Some(RuleId(5)));
    }

    #[tokio::test]
    async fn test_resave_of_same_rule_is_valid() {
        let pipeline = ValidationPipeline::new();
        let existing = vec![committed(5, "/taken/")];
        let mut candidate = draft(LinkEndpoint::path("/taken/"), LinkEndpoint::path("/x/"));
        candidate.id = Some(RuleId(5));

        let result = pipeline.validate(&mut candidate, &existing, &nodes()).await;

        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_probe_is_called_with_resolved_target() {
        let mut probe = MockDestinationProbe::new();
        probe
            .expect_check()
            .withf(|target| target.to_string() == "/about-us/")
            .times(1)
            .returning(|_| Ok(()));

        let pipeline = ValidationPipeline::with_probe(Arc::new(probe));
        let mut candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::node(NodeId(1)));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_probe_failure_blocks() {
        let mut probe = MockDestinationProbe::new();
        probe
            .expect_check()
            .times(1)
            .returning(|_| Err("404 Not Found".to_string()));

        let pipeline = ValidationPipeline::with_probe(Arc::new(probe));
        let mut candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::path("/missing/"));

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
        assert_eq!(
            result.findings,
            vec![Finding::UnreachableDestination {
                target: "/missing/".to_string(),
                reason: "404 Not Found".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_probe_skipped_for_malformed_target() {
        let mut probe = MockDestinationProbe::new();
        probe.expect_check().times(0);

        let pipeline = ValidationPipeline::with_probe(Arc::new(probe));
        let mut candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::default());

        let result = pipeline.validate(&mut candidate, &[], &nodes()).await;

        assert!(!result.is_valid());
    }

    #[test]
    fn test_into_validated() {
        let candidate = draft(LinkEndpoint::path("/a/"), LinkEndpoint::path("/b/"));

        let validated = ValidationResult::default()
            .into_validated(candidate.clone())
            .unwrap();
        assert_eq!(validated.draft(), &candidate);

        let blocked = ValidationResult {
            findings: vec![Finding::DuplicateRedirect {
                conflicting_id: RuleId(1),
            }],
        };
        assert!(blocked.into_validated(candidate).is_err());
    }

    #[test]
    fn test_finding_serialization() {
        let finding = Finding::DuplicateRedirect {
            conflicting_id: RuleId(3),
        };

        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "kind": "duplicate_redirect", "conflicting_id": 3 })
        );
    }
}
