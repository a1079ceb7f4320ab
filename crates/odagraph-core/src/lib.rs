#![forbid(unsafe_code)]

//! OData metadata resolver + normalized entity schema (headless).
//!
//! Design goals:
//! - one entity-relationship model regardless of source dialect
//!   (V2/V3 association-based navigation vs. V4 direct-typed navigation)
//! - deterministic, testable outputs
//! - fail closed: malformed metadata degrades to an empty schema, never a panic

pub mod error;
pub mod resolve;
pub mod schema;
pub mod service;

pub use error::{Error, Result};
pub use resolve::resolve_metadata;
pub use schema::{EntityType, FieldConstraint, NavigationProperty, Property, Schema};
pub use service::{ODataVersion, detect_version, detect_version_header, metadata_url};

#[cfg(test)]
mod tests;
