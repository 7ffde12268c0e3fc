//! Test utilities.
//!
//! [`RecordingEngine`] mimics an engine with a fixed set of catalogs and
//! schemas and records every statement it receives.

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::{Engine, EngineError, QueryOutput};
use crate::statement::Statement;

/// In-memory engine with scripted namespaces.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    namespaces: BTreeMap<String, BTreeSet<String>>,
    available: bool,
    catalog: Option<String>,
    schema: Option<String>,
    reported: Option<(String, String)>,
    statements: Vec<Statement>,
}

impl RecordingEngine {
    /// A reachable engine with no catalogs.
    pub fn new() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    /// An engine that refuses every statement as unreachable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Register a catalog/schema pair.
    pub fn with_schema(mut self, catalog: &str, schema: &str) -> Self {
        self.namespaces
            .entry(catalog.to_string())
            .or_default()
            .insert(schema.to_string());
        self
    }

    /// Answer the identity query with a fixed namespace instead of the
    /// selected one.
    pub fn with_reported_namespace(mut self, catalog: &str, schema: &str) -> Self {
        self.reported = Some((catalog.to_string(), schema.to_string()));
        self
    }

    /// Statements received, in order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn current_catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn current_schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }
}

impl Engine for RecordingEngine {
    fn execute(&mut self, statement: &Statement) -> Result<QueryOutput, EngineError> {
        self.statements.push(statement.clone());
        if !self.available {
            return Err(EngineError::Unavailable("no connection".to_string()));
        }

        match statement {
            Statement::UseCatalog(catalog) => {
                if !self.namespaces.contains_key(catalog.as_str()) {
                    return Err(EngineError::UnknownNamespace {
                        kind: "catalog",
                        name: catalog.to_string(),
                        message: format!("[NO_SUCH_CATALOG_EXCEPTION] Catalog '{}' was not found.", catalog),
                    });
                }
                self.catalog = Some(catalog.to_string());
                self.schema = Some("default".to_string());
                Ok(QueryOutput::empty())
            }
            Statement::UseSchema(schema) => {
                let known = self
                    .catalog
                    .as_ref()
                    .and_then(|c| self.namespaces.get(c))
                    .is_some_and(|schemas| schemas.contains(schema.as_str()));
                if !known {
                    return Err(EngineError::UnknownNamespace {
                        kind: "schema",
                        name: schema.to_string(),
                        message: format!("[SCHEMA_NOT_FOUND] The schema `{}` cannot be found.", schema),
                    });
                }
                self.schema = Some(schema.to_string());
                Ok(QueryOutput::empty())
            }
            Statement::CurrentNamespace => {
                let (catalog, schema) = self.reported.clone().unwrap_or_else(|| {
                    (
                        self.catalog.clone().unwrap_or_default(),
                        self.schema.clone().unwrap_or_default(),
                    )
                });
                Ok(QueryOutput::single_row(vec![catalog, schema]))
            }
        }
    }
}
