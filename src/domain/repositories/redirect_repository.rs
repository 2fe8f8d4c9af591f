//! Repository trait for redirect rule storage.

use crate::domain::entities::{RedirectRule, RedirectType, RuleId};
use crate::domain::resolution::ValidatedRule;
use crate::error::AppError;
use async_trait::async_trait;

/// Filter for listing rules in the management API.
///
/// `from` and `to` are case-insensitive substring matches on the literal
/// paths; `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub redirect_type: Option<RedirectType>,
}

/// Repository interface for redirect rules.
///
/// Persistence only ever accepts a [`ValidatedRule`]; there is no way to
/// store a draft that skipped the validation pipeline.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRedirectRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_redirect.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectRepository: Send + Sync {
    /// Loads every committed rule, ordered by id.
    ///
    /// The result is a consistent snapshot used for duplicate detection and
    /// for building the lookup table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn load_all(&self) -> Result<Vec<RedirectRule>, AppError>;

    /// Finds a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: RuleId) -> Result<Option<RedirectRule>, AppError>;

    /// Lists rules matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(
        &self,
        filter: &RuleFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<RedirectRule>, AppError>;

    /// Counts rules matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self, filter: &RuleFilter) -> Result<i64, AppError>;

    /// Inserts or updates a validated rule, depending on whether its draft
    /// carries an id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if an update targets a missing rule.
    /// Returns [`AppError::Conflict`] if the storage-level uniqueness check
    /// rejects the source.
    /// Returns [`AppError::Internal`] on database errors.
    async fn commit(&self, rule: ValidatedRule) -> Result<RedirectRule, AppError>;

    /// Deletes a rule. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: RuleId) -> Result<bool, AppError>;
}
