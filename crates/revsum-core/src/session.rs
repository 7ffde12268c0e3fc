//! Session initialization against an analytical engine.
//!
//! Selects the resolved catalog and then the schema. Both statements, and the
//! optional identity query, go to the engine as one batch so they share an
//! engine session. Each runs once, in order, and the first failure aborts
//! initialization.

use revsum_config::ResolvedConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{Engine, EngineError};
use crate::statement::Statement;

/// Namespace reported by the engine's identity query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentNamespace {
    pub catalog: String,
    pub schema: String,
}

/// Options for [`initialize_session`].
#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    /// Run the identity query after selecting the namespace.
    pub verify_identity: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            verify_identity: true,
        }
    }
}

/// What initialization did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    /// SQL text of the context statements, in submission order.
    pub statements: Vec<String>,
    /// Identity query result, when requested and parseable.
    pub current: Option<CurrentNamespace>,
    /// Whether the identity query disagreed with the requested namespace.
    pub mismatch: bool,
}

/// Apply the resolved catalog and schema to the engine.
pub fn initialize_session(
    config: &ResolvedConfig,
    engine: &mut dyn Engine,
    options: InitOptions,
) -> Result<SessionContext, EngineError> {
    let mut batch = vec![
        Statement::UseCatalog(config.catalog.clone()),
        Statement::UseSchema(config.schema.clone()),
    ];
    for statement in &batch {
        if let Some((kind, name)) = statement.target() {
            info!(kind, %name, "selecting namespace");
        }
        debug!(sql = %statement, "queued");
    }
    let statements: Vec<String> = batch.iter().map(Statement::sql).collect();
    if options.verify_identity {
        batch.push(Statement::CurrentNamespace);
    }

    let outputs = engine.execute_batch(&batch)?;

    let mut current = None;
    let mut mismatch = false;
    if options.verify_identity {
        let rows = outputs.last().map(|o| o.rows.as_slice()).unwrap_or_default();
        current = namespace_from_rows(rows);
        match &current {
            Some(ns)
                if ns.catalog != config.catalog.as_str() || ns.schema != config.schema.as_str() =>
            {
                warn!(
                    expected_catalog = %config.catalog,
                    expected_schema = %config.schema,
                    catalog = %ns.catalog,
                    schema = %ns.schema,
                    "engine reports a different namespace"
                );
                mismatch = true;
            }
            Some(_) => {}
            None => warn!("identity query returned no namespace row"),
        }
    }

    Ok(SessionContext {
        statements,
        current,
        mismatch,
    })
}

/// Pick the namespace row from identity query output, skipping a header row.
fn namespace_from_rows(rows: &[Vec<String>]) -> Option<CurrentNamespace> {
    rows.iter()
        .filter(|row| row.len() >= 2)
        .filter(|row| !row[0].eq_ignore_ascii_case("current_catalog()"))
        .last()
        .map(|row| CurrentNamespace {
            catalog: row[0].clone(),
            schema: row[1].clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DryRunEngine;
    use revsum_config::{resolve, Settings};

    #[test]
    fn dry_run_selects_catalog_then_schema() {
        let config = resolve(&Settings::default()).unwrap();
        let mut engine = DryRunEngine::new();
        let ctx = initialize_session(&config, &mut engine, InitOptions::default()).unwrap();

        assert_eq!(
            ctx.statements,
            vec![
                "use catalog `juan_dev`".to_string(),
                "use schema `sol_acc_review_summarisation`".to_string(),
            ]
        );
        assert_eq!(
            ctx.current,
            Some(CurrentNamespace {
                catalog: "juan_dev".to_string(),
                schema: "sol_acc_review_summarisation".to_string(),
            })
        );
        assert!(!ctx.mismatch);
        assert_eq!(engine.executed().len(), 3);
    }

    #[test]
    fn identity_query_skippable() {
        let config = resolve(&Settings::default()).unwrap();
        let mut engine = DryRunEngine::new();
        let ctx = initialize_session(
            &config,
            &mut engine,
            InitOptions {
                verify_identity: false,
            },
        )
        .unwrap();
        assert!(ctx.current.is_none());
        assert_eq!(engine.executed().len(), 2);
    }

    #[test]
    fn header_row_skipped() {
        let rows = vec![
            vec!["current_catalog()".to_string(), "current_schema()".to_string()],
            vec!["c".to_string(), "s".to_string()],
        ];
        assert_eq!(
            namespace_from_rows(&rows),
            Some(CurrentNamespace {
                catalog: "c".to_string(),
                schema: "s".to_string()
            })
        );
        assert_eq!(namespace_from_rows(&[]), None);
    }
}
