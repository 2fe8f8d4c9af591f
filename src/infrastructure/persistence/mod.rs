//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgRedirectRepository`] - Redirect rule storage
//! - [`PgContentNodeRepository`] - Content node lookup
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_content_node_repository;
pub mod pg_redirect_repository;
pub mod pg_token_repository;

pub use pg_content_node_repository::PgContentNodeRepository;
pub use pg_redirect_repository::PgRedirectRepository;
pub use pg_token_repository::PgTokenRepository;
