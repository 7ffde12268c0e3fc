//! Analytical engine clients.
//!
//! The engine is always injected: session setup takes a `&mut dyn Engine` and
//! never reaches for an ambient handle.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::statement::Statement;

/// Exit statuses a POSIX shell uses for "cannot execute" and "command not found".
const SHELL_EXEC_FAILURES: [i32; 2] = [126, 127];

/// Failure reported by an engine client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("unknown {kind} '{name}': {message}")]
    UnknownNamespace {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("statement `{statement}` failed: {message}")]
    Execution { statement: String, message: String },
}

impl From<EngineError> for revsum_common::Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(message) => revsum_common::Error::EngineUnavailable(message),
            EngineError::UnknownNamespace {
                kind,
                name,
                message,
            } => revsum_common::Error::UnknownNamespace {
                kind: kind.to_string(),
                name,
                message,
            },
            EngineError::Execution { statement, message } => {
                revsum_common::Error::EngineExecution { statement, message }
            }
        }
    }
}

/// Rows returned by a statement. Context statements return no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub rows: Vec<Vec<String>>,
}

impl QueryOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single_row(row: Vec<String>) -> Self {
        Self { rows: vec![row] }
    }
}

/// A connection to an analytical engine able to run SQL statements.
pub trait Engine {
    /// Run one statement to completion.
    fn execute(&mut self, statement: &Statement) -> Result<QueryOutput, EngineError>;

    /// Run statements in order within one engine session, stopping at the
    /// first failure. Returns one output per statement.
    fn execute_batch(&mut self, statements: &[Statement]) -> Result<Vec<QueryOutput>, EngineError> {
        statements.iter().map(|s| self.execute(s)).collect()
    }
}

/// Engine that accepts every statement without contacting anything.
///
/// The identity query answers with whatever the `use` statements selected.
#[derive(Debug, Default)]
pub struct DryRunEngine {
    executed: Vec<String>,
    catalog: Option<String>,
    schema: Option<String>,
}

impl DryRunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// SQL text of every statement seen, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl Engine for DryRunEngine {
    fn execute(&mut self, statement: &Statement) -> Result<QueryOutput, EngineError> {
        info!(sql = %statement, "dry run");
        self.executed.push(statement.sql());
        match statement {
            Statement::UseCatalog(catalog) => {
                self.catalog = Some(catalog.to_string());
                self.schema = None;
                Ok(QueryOutput::empty())
            }
            Statement::UseSchema(schema) => {
                self.schema = Some(schema.to_string());
                Ok(QueryOutput::empty())
            }
            Statement::CurrentNamespace => Ok(QueryOutput::single_row(vec![
                self.catalog.clone().unwrap_or_default(),
                self.schema.clone().unwrap_or_default(),
            ])),
        }
    }
}

/// Engine backed by an external SQL client program.
///
/// A batch is written to one client process as a script, one `;`-terminated
/// statement per line, so `use catalog` is still in effect when `use schema`
/// runs. A zero exit status is success. Stdout is read as rows of tab- or
/// comma-separated cells and attributed to the last statement of the batch.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Engine for CommandEngine {
    fn execute(&mut self, statement: &Statement) -> Result<QueryOutput, EngineError> {
        let mut outputs = self.execute_batch(std::slice::from_ref(statement))?;
        Ok(outputs.pop().unwrap_or_default())
    }

    fn execute_batch(&mut self, statements: &[Statement]) -> Result<Vec<QueryOutput>, EngineError> {
        if statements.is_empty() {
            return Ok(Vec::new());
        }

        let script: String = statements.iter().map(|s| format!("{};\n", s.sql())).collect();
        debug!(program = %self.program, statements = statements.len(), "submitting script");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to start {}: {}", self.program, e))
            })?;

        // A client that dies early closes its stdin; its exit status explains why.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(script.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|e| {
            EngineError::Unavailable(format!("{} did not complete: {}", self.program, e))
        })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(statements, message, output.status.code()));
        }
        if let Err(e) = write_result {
            return Err(EngineError::Unavailable(format!(
                "failed to send statements to {}: {}",
                self.program, e
            )));
        }

        let mut outputs = vec![QueryOutput::empty(); statements.len()];
        if let Some(last) = outputs.last_mut() {
            *last = parse_rows(&String::from_utf8_lossy(&output.stdout));
        }
        Ok(outputs)
    }
}

/// Map a failed batch onto the error taxonomy.
pub fn classify_failure(
    statements: &[Statement],
    message: String,
    exit_code: Option<i32>,
) -> EngineError {
    let message = if message.is_empty() {
        match exit_code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    } else {
        message
    };

    let not_executable = exit_code.is_some_and(|code| SHELL_EXEC_FAILURES.contains(&code));
    if not_executable || message.to_ascii_lowercase().contains("command not found") {
        return EngineError::Unavailable(message);
    }

    if let Some(missing) = missing_namespace_kind(&message) {
        let target = statements
            .iter()
            .filter_map(Statement::target)
            .find(|(kind, _)| *kind == missing);
        if let Some((kind, name)) = target {
            return EngineError::UnknownNamespace {
                kind,
                name: name.to_string(),
                message,
            };
        }
    }

    let statement = statements
        .iter()
        .map(Statement::sql)
        .collect::<Vec<_>>()
        .join("; ");
    EngineError::Execution { statement, message }
}

/// Which namespace kind an engine message reports as missing, if any.
fn missing_namespace_kind(message: &str) -> Option<&'static str> {
    let lower = message.to_ascii_lowercase();

    for (kind, markers) in [
        ("catalog", ["no_such_catalog", "catalog_not_found"]),
        ("schema", ["no_such_schema", "schema_not_found"]),
    ] {
        if markers.iter().any(|m| lower.contains(m)) {
            return Some(kind);
        }
    }

    // Prose form: "Catalog 'x' was not found", "schema x does not exist".
    for kind in ["catalog", "schema"] {
        if let Some(pos) = lower.find(kind) {
            let rest = &lower[pos..];
            if rest.contains("not found") || rest.contains("does not exist") {
                return Some(kind);
            }
        }
    }
    None
}

fn parse_rows(stdout: &str) -> QueryOutput {
    let rows = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let sep = if line.contains('\t') { '\t' } else { ',' };
            line.split(sep).map(|cell| cell.trim().to_string()).collect()
        })
        .collect();
    QueryOutput { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revsum_config::Identifier;

    fn ident(name: &str) -> Identifier {
        Identifier::new("test", name).unwrap()
    }

    fn context_batch() -> Vec<Statement> {
        vec![
            Statement::UseCatalog(ident("juan_dev")),
            Statement::UseSchema(ident("reviews")),
            Statement::CurrentNamespace,
        ]
    }

    #[test]
    fn dry_run_tracks_namespace() {
        let mut engine = DryRunEngine::new();
        engine.execute(&Statement::UseCatalog(ident("c"))).unwrap();
        engine.execute(&Statement::UseSchema(ident("s"))).unwrap();
        let out = engine.execute(&Statement::CurrentNamespace).unwrap();
        assert_eq!(out.rows, vec![vec!["c".to_string(), "s".to_string()]]);
        assert_eq!(engine.executed().len(), 3);
        assert_eq!(engine.executed()[0], "use catalog `c`");
    }

    #[test]
    fn default_batch_runs_each_statement() {
        let mut engine = DryRunEngine::new();
        let outputs = engine.execute_batch(&context_batch()).unwrap();
        assert_eq!(outputs.len(), 3);
        assert_eq!(
            outputs[2].rows,
            vec![vec!["juan_dev".to_string(), "reviews".to_string()]]
        );
    }

    #[test]
    fn missing_catalog_classified() {
        let err = classify_failure(
            &context_batch(),
            "[NO_SUCH_CATALOG_EXCEPTION] Catalog 'juan_dev' was not found.".to_string(),
            Some(1),
        );
        assert!(matches!(
            err,
            EngineError::UnknownNamespace { kind: "catalog", ref name, .. } if name == "juan_dev"
        ));
    }

    #[test]
    fn missing_schema_attributed_to_schema_statement() {
        let err = classify_failure(
            &context_batch(),
            "[SCHEMA_NOT_FOUND] The schema `reviews` cannot be found.".to_string(),
            Some(1),
        );
        assert!(matches!(
            err,
            EngineError::UnknownNamespace { kind: "schema", ref name, .. } if name == "reviews"
        ));
    }

    #[test]
    fn prose_missing_namespace_classified() {
        let err = classify_failure(
            &context_batch(),
            "Error: schema reviews does not exist".to_string(),
            Some(1),
        );
        assert!(matches!(err, EngineError::UnknownNamespace { kind: "schema", .. }));
    }

    #[test]
    fn shell_command_not_found_is_unavailable() {
        let err = classify_failure(
            &context_batch(),
            "sh: 1: databricks-sql-cli-not-installed: not found".to_string(),
            Some(127),
        );
        assert!(matches!(err, EngineError::Unavailable(_)));

        let err = classify_failure(
            &context_batch(),
            "bash: sql-client: command not found".to_string(),
            Some(1),
        );
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[test]
    fn not_executable_is_unavailable() {
        let err = classify_failure(&context_batch(), "permission denied".to_string(), Some(126));
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[test]
    fn unrelated_missing_things_are_execution_errors() {
        let err = classify_failure(
            &context_batch(),
            "Error: profile DEFAULT does not exist in ~/.databrickscfg".to_string(),
            Some(1),
        );
        assert!(matches!(err, EngineError::Execution { .. }));

        let err = classify_failure(
            &context_batch(),
            "warehouse abc123 not found".to_string(),
            Some(1),
        );
        assert!(matches!(err, EngineError::Execution { .. }));
    }

    #[test]
    fn other_failures_keep_native_message() {
        let err = classify_failure(
            &[Statement::UseSchema(ident("s"))],
            "PERMISSION_DENIED: user lacks USE SCHEMA".to_string(),
            Some(1),
        );
        assert_eq!(
            err,
            EngineError::Execution {
                statement: "use schema `s`".to_string(),
                message: "PERMISSION_DENIED: user lacks USE SCHEMA".to_string(),
            }
        );
    }

    #[test]
    fn empty_stderr_reports_status() {
        let err = classify_failure(&[Statement::CurrentNamespace], String::new(), Some(3));
        assert!(err.to_string().contains("exited with status 3"));
    }

    #[test]
    fn parse_rows_handles_tsv_and_csv() {
        assert_eq!(
            parse_rows("juan_dev\tsol\n\n").rows,
            vec![vec!["juan_dev".to_string(), "sol".to_string()]]
        );
        assert_eq!(
            parse_rows("a, b\n").rows,
            vec![vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn missing_program_is_unavailable() {
        let mut engine = CommandEngine::new("/nonexistent/revsum-sql-client", vec![]);
        let err = engine
            .execute(&Statement::UseCatalog(ident("c")))
            .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn wrapper_with_missing_client_is_unavailable() {
        let mut engine = CommandEngine::new(
            "sh",
            vec!["-c".to_string(), "databricks-sql-cli-not-installed".to_string()],
        );
        let err = engine.execute_batch(&context_batch()).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn batch_is_one_client_session() {
        // Counts the statements it receives and reports the count as a row.
        let script = r#"n=0
while IFS= read -r s; do n=$((n+1)); done
printf 'statements\t%s\n' "$n""#;
        let mut engine = CommandEngine::new("sh", vec!["-c".to_string(), script.to_string()]);
        let outputs = engine.execute_batch(&context_batch()).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs[0].rows.is_empty());
        assert_eq!(
            outputs[2].rows,
            vec![vec!["statements".to_string(), "3".to_string()]]
        );
    }

    #[test]
    fn engine_errors_map_to_common_codes() {
        let e: revsum_common::Error = EngineError::Unavailable("down".into()).into();
        assert_eq!(e.code(), 20);
        let e: revsum_common::Error = EngineError::UnknownNamespace {
            kind: "schema",
            name: "x".into(),
            message: "not found".into(),
        }
        .into();
        assert_eq!(e.code(), 21);
    }
}
