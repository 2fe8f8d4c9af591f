//! Business logic services for the application layer.

pub mod auth_service;
pub mod redirect_service;

pub use auth_service::{AuthService, generate_token, hash_token};
pub use redirect_service::{DryRun, RedirectService, RedirectSummary};
