//! Command-line definitions for the `revsum` binary.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use revsum_common::OutputFormat;
use revsum_config::SettingsLayer;

/// Resolve notebook session configuration and select the engine namespace.
#[derive(Parser, Debug)]
#[command(name = "revsum", version, about)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Settings file (JSON). Defaults to <config_dir>/revsum/settings.json
    #[arg(long, global = true, env = "REVSUM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Net verbosity from `-v` and `-q`.
    pub fn verbosity(&self) -> i8 {
        let v = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let q = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        v.saturating_sub(q)
    }
}

/// Settings overrides. Each flag also reads an environment variable.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Unity Catalog name
    #[arg(long = "catalog", global = true, env = "REVSUM_CATALOG", value_name = "NAME")]
    pub catalog_name: Option<String>,

    /// Schema name
    #[arg(long = "schema", global = true, env = "REVSUM_SCHEMA", value_name = "NAME")]
    pub schema_name: Option<String>,

    /// Use Unity Catalog namespaces
    #[arg(
        long = "unity-catalog",
        global = true,
        env = "REVSUM_USE_UC",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub use_unity_catalog: Option<bool>,

    /// Disable Unity Catalog (implies dbfs paths)
    #[arg(long, global = true)]
    pub no_unity_catalog: bool,

    /// Use volume-backed storage paths
    #[arg(
        long = "volumes",
        global = true,
        env = "REVSUM_USE_VOLUMES",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub use_volumes: Option<bool>,

    /// Use legacy dbfs storage paths
    #[arg(long, global = true)]
    pub no_volumes: bool,

    /// How many popular books to take
    #[arg(long, global = true, env = "REVSUM_TOP_BOOK_COUNT", value_name = "N")]
    pub top_book_count: Option<u32>,

    /// Further sampling fraction in (0, 1]
    #[arg(long, global = true, env = "REVSUM_SAMPLING_FRACTION", value_name = "F")]
    pub sampling_fraction: Option<f64>,

    /// Disable downstream sampling
    #[arg(long, global = true)]
    pub no_sampling: bool,
}

impl SettingsArgs {
    /// The CLI/env layer. `--no-*` flags win over their positive forms.
    pub fn to_layer(&self) -> SettingsLayer {
        SettingsLayer {
            catalog_name: self.catalog_name.clone(),
            schema_name: self.schema_name.clone(),
            use_unity_catalog: if self.no_unity_catalog {
                Some(false)
            } else {
                self.use_unity_catalog
            },
            use_volumes: if self.no_volumes {
                Some(false)
            } else {
                self.use_volumes
            },
            top_book_count: self.top_book_count,
            top_book_sampling_fraction: if self.no_sampling {
                Some(None)
            } else {
                self.sampling_fraction.map(Some)
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved configuration without contacting an engine
    Resolve,
    /// Resolve, then select the catalog and schema on the engine
    Init(InitArgs),
    /// Validate the layered settings
    Validate,
    /// Print the JSON Schema of the settings file
    Schema,
}

/// Arguments for the init command
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Record statements without contacting an engine (wins over --engine-cmd)
    #[arg(long)]
    pub dry_run: bool,

    /// SQL client program; each statement is written to its stdin
    #[arg(long, env = "REVSUM_ENGINE_CMD", value_name = "PROGRAM")]
    pub engine_cmd: Option<String>,

    /// Argument passed to the SQL client (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Skip the `select current_catalog(), current_schema()` check
    #[arg(long)]
    pub skip_identity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_flags_win() {
        let cli = Cli::try_parse_from([
            "revsum",
            "resolve",
            "--unity-catalog",
            "--no-unity-catalog",
            "--sampling-fraction",
            "0.5",
            "--no-sampling",
        ])
        .unwrap();
        let layer = cli.settings.to_layer();
        assert_eq!(layer.use_unity_catalog, Some(false));
        assert_eq!(layer.top_book_sampling_fraction, Some(None));
    }

    #[test]
    fn boolish_values_accepted() {
        let cli = Cli::try_parse_from(["revsum", "--volumes", "no", "resolve"]).unwrap();
        assert_eq!(cli.settings.use_volumes, Some(false));
    }

    #[test]
    fn verbosity_nets_out() {
        let cli = Cli::try_parse_from(["revsum", "-vv", "-q", "validate"]).unwrap();
        assert_eq!(cli.verbosity(), 1);
    }

    #[test]
    fn init_args_parse() {
        let cli = Cli::try_parse_from([
            "revsum",
            "init",
            "--engine-cmd",
            "sql-client",
            "--engine-arg",
            "--profile=dev",
            "--skip-identity",
        ])
        .unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.engine_cmd.as_deref(), Some("sql-client"));
                assert_eq!(args.engine_args, vec!["--profile=dev".to_string()]);
                assert!(args.skip_identity);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
