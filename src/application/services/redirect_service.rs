//! Redirect rule management service.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::entities::{
    NodeId, NodeSnapshot, RedirectRule, RuleChanges, RuleDraft, RuleId, Side,
};
use crate::domain::repositories::{
    ContentNodeRepository, RedirectRepository, RuleFilter, snapshot_of,
};
use crate::domain::resolution::{
    RedirectTable, ValidationPipeline, ValidationResult, resolve_effective_path, status_code_for,
};
use crate::error::AppError;
use crate::infrastructure::cache::{RebuildError, ResolutionCache};

/// A rule together with what it currently resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSummary {
    pub rule: RedirectRule,
    pub from_link: Option<String>,
    pub to_link: Option<String>,
    pub status_code: u16,
}

impl RedirectSummary {
    pub fn of(rule: RedirectRule, nodes: &NodeSnapshot) -> Self {
        Self {
            from_link: resolve_effective_path(&rule, Side::From, nodes),
            to_link: resolve_effective_path(&rule, Side::To, nodes),
            status_code: status_code_for(&rule),
            rule,
        }
    }
}

/// Outcome of a dry-run validation.
#[derive(Debug, Clone)]
pub struct DryRun {
    /// The draft as it would be committed, after normalization.
    pub draft: RuleDraft,
    pub result: ValidationResult,
}

/// Creates, edits and deletes redirect rules.
///
/// Every mutation runs under one write lock: load the committed set, apply
/// the changes, validate, commit, then invalidate the lookup table. This
/// keeps the in-process duplicate check consistent; the database's unique
/// indexes cover writers in other processes.
pub struct RedirectService<R: RedirectRepository, N: ContentNodeRepository> {
    rules: Arc<R>,
    nodes: Arc<N>,
    cache: Arc<ResolutionCache<R, N>>,
    pipeline: ValidationPipeline,
    write_lock: Mutex<()>,
}

impl<R: RedirectRepository, N: ContentNodeRepository> RedirectService<R, N> {
    pub fn new(
        rules: Arc<R>,
        nodes: Arc<N>,
        cache: Arc<ResolutionCache<R, N>>,
        pipeline: ValidationPipeline,
    ) -> Self {
        Self {
            rules,
            nodes,
            cache,
            pipeline,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a rule from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with every finding if the rule is rejected.
    /// Returns [`AppError::Conflict`] if a concurrent writer took the source first.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create(&self, changes: RuleChanges) -> Result<RedirectSummary, AppError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.rules.load_all().await?;
        let nodes = self.snapshot_for(&RuleDraft::new(), &changes).await?;

        let mut draft = RuleDraft::new();
        draft.apply(changes, &nodes);

        let rule = self.validate_and_commit(draft, &existing, &nodes).await?;
        info!(rule_id = %rule.id, "Redirect rule created");

        self.invalidate_after_commit().await;
        Ok(RedirectSummary::of(rule, &nodes))
    }

    /// Applies a partial update to a committed rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rule does not exist; otherwise as
    /// for [`RedirectService::create`].
    pub async fn update(
        &self,
        id: RuleId,
        changes: RuleChanges,
    ) -> Result<RedirectSummary, AppError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.rules.load_all().await?;
        let current = existing
            .iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| rule_not_found(id))?;

        let mut draft = RuleDraft::from_rule(current);
        let nodes = self.snapshot_for(&draft, &changes).await?;
        draft.apply(changes, &nodes);

        let rule = self.validate_and_commit(draft, &existing, &nodes).await?;
        info!(rule_id = %rule.id, "Redirect rule updated");

        self.invalidate_after_commit().await;
        Ok(RedirectSummary::of(rule, &nodes))
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rule does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete(&self, id: RuleId) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        if !self.rules.delete(id).await? {
            return Err(rule_not_found(id));
        }
        info!(rule_id = %id, "Redirect rule deleted");

        self.invalidate_after_commit().await;
        Ok(())
    }

    /// Fetches one rule with its resolved links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rule does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get(&self, id: RuleId) -> Result<RedirectSummary, AppError> {
        let rule = self
            .rules
            .find_by_id(id)
            .await?
            .ok_or_else(|| rule_not_found(id))?;

        let nodes = snapshot_of(self.nodes.as_ref(), &referenced_nodes([&rule])).await?;
        Ok(RedirectSummary::of(rule, &nodes))
    }

    /// Lists rules one page at a time (1-indexed), with the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list(
        &self,
        filter: &RuleFilter,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<RedirectSummary>, i64), AppError> {
        let offset = (page - 1) * page_size;

        let rules = self.rules.list(filter, offset, page_size).await?;
        let total = self.rules.count(filter).await?;

        let nodes = snapshot_of(self.nodes.as_ref(), &referenced_nodes(&rules)).await?;
        let items = rules
            .into_iter()
            .map(|rule| RedirectSummary::of(rule, &nodes))
            .collect();

        Ok((items, total))
    }

    /// Runs the validation pipeline without committing anything.
    ///
    /// With `id` the changes are applied on top of that rule, as an update
    /// would; without it they describe a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `id` does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn validate(
        &self,
        id: Option<RuleId>,
        changes: RuleChanges,
    ) -> Result<DryRun, AppError> {
        let existing = self.rules.load_all().await?;

        let mut draft = match id {
            Some(id) => existing
                .iter()
                .find(|rule| rule.id == id)
                .map(RuleDraft::from_rule)
                .ok_or_else(|| rule_not_found(id))?,
            None => RuleDraft::new(),
        };

        let nodes = self.snapshot_for(&draft, &changes).await?;
        draft.apply(changes, &nodes);

        let result = self.pipeline.validate(&mut draft, &existing, &nodes).await;
        Ok(DryRun { draft, result })
    }

    /// Forces an invalidation and rebuild of the lookup table.
    ///
    /// # Errors
    ///
    /// Returns [`RebuildError`] if the rebuild failed; the previous table
    /// keeps serving.
    pub async fn rebuild_cache(&self) -> Result<Arc<RedirectTable>, RebuildError> {
        self.cache.invalidate().await
    }

    async fn validate_and_commit(
        &self,
        mut draft: RuleDraft,
        existing: &[RedirectRule],
        nodes: &NodeSnapshot,
    ) -> Result<RedirectRule, AppError> {
        let result = self.pipeline.validate(&mut draft, existing, nodes).await;

        let validated = result
            .into_validated(draft)
            .map_err(|rejected| AppError::rejected(&rejected))?;

        self.rules.commit(validated).await
    }

    async fn snapshot_for(
        &self,
        draft: &RuleDraft,
        changes: &RuleChanges,
    ) -> Result<NodeSnapshot, AppError> {
        let ids: BTreeSet<NodeId> = [draft.from.node, draft.to.node]
            .into_iter()
            .flatten()
            .chain(changes.referenced_nodes())
            .collect();

        let ids: Vec<NodeId> = ids.into_iter().collect();
        snapshot_of(self.nodes.as_ref(), &ids).await
    }

    /// Commits stand even when the rebuild fails; the table is then stale
    /// until the next successful rebuild or refresh.
    async fn invalidate_after_commit(&self) {
        if let Err(e) = self.cache.invalidate().await {
            warn!(error = %e, "Lookup table rebuild after commit failed");
        }
    }
}

fn rule_not_found(id: RuleId) -> AppError {
    AppError::not_found("Redirect rule not found", json!({ "id": id }))
}

fn referenced_nodes<'a>(rules: impl IntoIterator<Item = &'a RedirectRule>) -> Vec<NodeId> {
    rules
        .into_iter()
        .flat_map(|rule| [rule.from.node, rule.to.node])
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
