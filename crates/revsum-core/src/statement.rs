//! Statements sent to the analytical engine.

use revsum_config::Identifier;
use std::fmt;

/// Identity query used to confirm the session context.
pub const CURRENT_NAMESPACE_SQL: &str = "select current_catalog(), current_schema()";

/// A context-setting or diagnostic statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    UseCatalog(Identifier),
    UseSchema(Identifier),
    CurrentNamespace,
}

impl Statement {
    /// Exact text submitted to the engine.
    pub fn sql(&self) -> String {
        match self {
            Statement::UseCatalog(catalog) => format!("use catalog {}", catalog.quoted()),
            Statement::UseSchema(schema) => format!("use schema {}", schema.quoted()),
            Statement::CurrentNamespace => CURRENT_NAMESPACE_SQL.to_string(),
        }
    }

    /// Namespace kind and name targeted by a `use` statement.
    pub fn target(&self) -> Option<(&'static str, &Identifier)> {
        match self {
            Statement::UseCatalog(catalog) => Some(("catalog", catalog)),
            Statement::UseSchema(schema) => Some(("schema", schema)),
            Statement::CurrentNamespace => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Identifier {
        Identifier::new("test", name).unwrap()
    }

    #[test]
    fn use_statements_quote_names() {
        assert_eq!(
            Statement::UseCatalog(ident("juan_dev")).sql(),
            "use catalog `juan_dev`"
        );
        assert_eq!(
            Statement::UseSchema(ident("sol_acc_review_summarisation")).sql(),
            "use schema `sol_acc_review_summarisation`"
        );
    }

    #[test]
    fn injected_names_stay_inside_quotes() {
        let stmt = Statement::UseSchema(ident("x`; drop table t; --"));
        assert_eq!(stmt.sql(), "use schema `x``; drop table t; --`");
    }

    #[test]
    fn identity_query_text() {
        assert_eq!(
            Statement::CurrentNamespace.to_string(),
            "select current_catalog(), current_schema()"
        );
        assert!(Statement::CurrentNamespace.target().is_none());
    }
}
