//! Request and response bodies of the management API.
//!
//! Inputs derive `validator::Validate` for field-level limits; rule-level
//! checks stay in the validation pipeline.

pub mod health;
pub mod pagination;
pub mod redirect;
