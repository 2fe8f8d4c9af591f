//! Domain layer containing redirect entities and the resolution engine.
//!
//! # Architecture
//!
//! - [`entities`] - Redirect rules, endpoints and content nodes
//! - [`repositories`] - Data access trait definitions
//! - [`resolution`] - Path resolution, duplicate detection, validation and
//!   the lookup table
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Orchestration lives in [`crate::application::services`].

pub mod entities;
pub mod repositories;
pub mod resolution;
