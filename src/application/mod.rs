//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation and cache invalidation
//! and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Redirect rule management
//! - [`services::auth_service::AuthService`] - API token authentication and authorization

pub mod services;
