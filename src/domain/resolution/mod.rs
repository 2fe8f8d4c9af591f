//! Redirect resolution and validation engine.
//!
//! - [`link_resolver`] - Effective From/To paths and status codes
//! - [`duplicate_detector`] - Source collision detection
//! - [`validation`] - Normalization, field checks and duplicate checks
//! - [`table`] - Immutable lookup table built from committed rules
//!
//! Everything here is pure: persistence and caching live in
//! [`crate::infrastructure`].

pub mod duplicate_detector;
pub mod link_resolver;
pub mod table;
pub mod validation;

pub use duplicate_detector::{DuplicateKey, find_conflict};
pub use link_resolver::{resolve_effective_path, status_code_for};
pub use table::{RedirectTable, ResolvedRedirect};
pub use validation::{
    DestinationProbe, Finding, ValidatedRule, ValidationPipeline, ValidationResult,
};
