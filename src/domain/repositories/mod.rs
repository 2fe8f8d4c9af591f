//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access; implementations live in
//! `crate::infrastructure::persistence`, and `mockall` generates mocks for
//! unit tests.
//!
//! # Available Repositories
//!
//! - [`RedirectRepository`] - Redirect rule storage
//! - [`ContentNodeRepository`] - Content node lookup
//! - [`TokenRepository`] - API token authentication

pub mod content_node_repository;
pub mod redirect_repository;
pub mod token_repository;

pub use content_node_repository::{ContentNodeRepository, snapshot_of};
pub use redirect_repository::{RedirectRepository, RuleFilter};
pub use token_repository::TokenRepository;

#[cfg(test)]
pub use content_node_repository::MockContentNodeRepository;
#[cfg(test)]
pub use redirect_repository::MockRedirectRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
