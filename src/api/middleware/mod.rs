//! Tower layers wrapped around the router.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
