//! Semantic validation of settings.
//!
//! Validation collects every problem instead of stopping at the first one, so
//! `revsum validate` can report a complete picture.

use serde::Serialize;
use thiserror::Error;

use crate::identifier::Identifier;
use crate::settings::Settings;

/// A single settings problem.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyIdentifier { field: &'static str },

    #[error("{field} contains a control character at byte {position}")]
    ControlCharacter { field: &'static str, position: usize },

    #[error("{field} must be a single path segment, got '{value}'")]
    PathSegment { field: &'static str, value: String },

    #[error("top_book_count must be greater than zero")]
    ZeroTopBookCount,

    #[error("top_book_sampling_fraction must be in (0, 1], got {value}")]
    SamplingFractionOutOfRange { value: f64 },
}

/// Outcome of validating a [`Settings`] value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate all settings invariants.
pub fn validate_settings(settings: &Settings) -> ValidationResult {
    let mut result = ValidationResult::default();

    if let Err(e) = Identifier::new("catalog_name", &settings.catalog_name) {
        result.errors.push(e);
    }
    if let Err(e) = Identifier::new("schema_name", &settings.schema_name) {
        result.errors.push(e);
    }

    if settings.top_book_count == 0 {
        result.errors.push(ValidationError::ZeroTopBookCount);
    }

    if let Some(value) = settings.top_book_sampling_fraction {
        if !(value.is_finite() && value > 0.0 && value <= 1.0) {
            result
                .errors
                .push(ValidationError::SamplingFractionOutOfRange { value });
        }
    }

    if settings.use_volumes && !settings.use_unity_catalog {
        result.warnings.push(
            "use_volumes is ignored because use_unity_catalog is disabled".to_string(),
        );
    }

    result
}
