//! Helpers shared across layers.
//!
//! - [`path_normalizer`] - Canonical form of literal redirect paths

pub mod path_normalizer;
