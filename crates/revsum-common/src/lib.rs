//! Review summarisation common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the revsum crates:
//! - Session IDs for configuration snapshots
//! - Schema versioning for JSON outputs
//! - Common error types with stable numeric codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::SessionId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
