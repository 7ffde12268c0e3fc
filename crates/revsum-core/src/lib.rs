//! Review summarisation session setup.
//!
//! Resolves the notebook session configuration and applies the resulting
//! catalog and schema to an injected analytical engine.

pub mod cli;
pub mod commands;
pub mod engine;
pub mod exit_codes;
pub mod logging;
pub mod session;
pub mod statement;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use engine::{CommandEngine, DryRunEngine, Engine, EngineError, QueryOutput};
pub use exit_codes::ExitCode;
pub use session::{initialize_session, CurrentNamespace, InitOptions, SessionContext};
pub use statement::Statement;
