//! Adapters behind the domain traits.
//!
//! [`persistence`] stores rules, content nodes and tokens in PostgreSQL.
//! [`cache`] owns the in-process [`cache::ResolutionCache`] and the optional
//! Redis copy of the redirect table.

pub mod cache;
pub mod persistence;
