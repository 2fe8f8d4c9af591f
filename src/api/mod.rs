//! HTTP surface: the redirect fallback plus the `/api` management endpoints.
//!
//! Handlers stay thin. They parse [`dto`] types, call the application
//! services and map results back to JSON; [`routes`] assembles the `/api`
//! router and [`middleware`] holds the auth, rate limit and trace layers.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
