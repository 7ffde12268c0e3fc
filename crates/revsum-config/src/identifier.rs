//! Namespace identifiers for catalogs and schemas.
//!
//! Identifiers come straight from user-editable settings, so they are treated
//! as untrusted. An [`Identifier`] is guaranteed non-empty, free of control
//! characters, and usable as a single storage path segment (no `/`, not `.`
//! or `..`). It only ever reaches an engine statement through
//! [`Identifier::quoted`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validate::ValidationError;

/// A validated catalog or schema name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `value` as the identifier for `field`.
    pub fn new(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier { field });
        }
        if let Some(position) = value.char_indices().find(|(_, c)| c.is_control()).map(|(i, _)| i)
        {
            return Err(ValidationError::ControlCharacter { field, position });
        }
        if value.contains('/') || value == "." || value == ".." {
            return Err(ValidationError::PathSegment {
                field,
                value: value.to_string(),
            });
        }
        Ok(Identifier(value.to_string()))
    }

    /// The raw name, as used in storage paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form for statements. Embedded backticks are doubled.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0.replace('`', "``"))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
