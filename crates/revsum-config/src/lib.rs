//! Review summarisation session configuration.
//!
//! This crate provides:
//! - Typed settings for the notebook session literals
//! - Layered loading (CLI → env → settings file → defaults)
//! - Semantic validation of namespace identifiers and sampling parameters
//! - The resolver that derives storage paths and the effective volumes flag
//! - Config snapshots for session output

pub mod identifier;
pub mod load;
pub mod resolve;
pub mod sampling;
pub mod settings;
pub mod snapshot;
pub mod validate;

pub use identifier::Identifier;
pub use load::{load_settings, ConfigPaths, LoadError};
pub use resolve::{resolve, ResolveError, ResolvedConfig, StoragePaths};
pub use sampling::Sampling;
pub use settings::{Settings, SettingsLayer};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_settings, ValidationError, ValidationResult};
