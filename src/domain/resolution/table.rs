//! Immutable redirect lookup table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

use super::link_resolver::{resolve_effective_path, status_code_for};
use crate::domain::entities::{NodeSnapshot, RedirectRule, RuleId, Side};
use crate::utils::path_normalizer::lookup_key;

/// Where a matched request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRedirect {
    pub rule_id: RuleId,
    pub target_path: String,
    pub status_code: u16,
}

/// A fully built mapping from normalized source path to redirect.
///
/// Tables are never mutated after [`RedirectTable::build`]; a rebuild
/// produces a new table that replaces the old one as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTable {
    entries: HashMap<String, ResolvedRedirect>,
    built_at: Option<DateTime<Utc>>,
}

impl RedirectTable {
    /// Table with no entries, used before the first build.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the table from committed rules.
    ///
    /// Rules whose source or target does not resolve are skipped. Effective
    /// sources are unique within a key mode, but a literal source and a node
    /// source can still resolve to the same path; the rule that comes first
    /// in `rules` keeps the slot.
    pub fn build(rules: &[RedirectRule], nodes: &NodeSnapshot) -> Self {
        let mut entries = HashMap::with_capacity(rules.len());

        for rule in rules {
            let Some(from) = resolve_effective_path(rule, Side::From, nodes) else {
                debug!(rule_id = %rule.id, "Skipping rule without a usable source");
                continue;
            };
            let Some(target_path) = resolve_effective_path(rule, Side::To, nodes) else {
                debug!(rule_id = %rule.id, "Skipping rule without a usable target");
                continue;
            };

            match entries.entry(lookup_key(&from)) {
                Entry::Vacant(slot) => {
                    slot.insert(ResolvedRedirect {
                        rule_id: rule.id,
                        target_path,
                        status_code: status_code_for(rule),
                    });
                }
                Entry::Occupied(slot) => {
                    warn!(
                        path = %slot.key(),
                        kept = %slot.get().rule_id,
                        skipped = %rule.id,
                        "Two rules resolve to the same source path"
                    );
                }
            }
        }

        Self {
            entries,
            built_at: Some(Utc::now()),
        }
    }

    /// Looks up a request path, normalizing it first.
    pub fn lookup(&self, request_path: &str) -> Option<&ResolvedRedirect> {
        self.entries.get(&lookup_key(request_path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the table was built, `None` for the initial empty table.
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }
}
