//! Command execution for the `revsum` binary.

use std::io::Write;

use revsum_common::{Error, OutputFormat, Result, SCHEMA_VERSION};
use revsum_config::{
    load_settings, resolve, validate_settings, ConfigPaths, ConfigSnapshot, ResolvedConfig,
    Settings, SettingsLayer,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands, InitArgs};
use crate::engine::{CommandEngine, DryRunEngine, Engine};
use crate::exit_codes::ExitCode;
use crate::session::{initialize_session, InitOptions, SessionContext};

/// Run the parsed command, writing results to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<ExitCode> {
    if let Commands::Schema = cli.command {
        let schema = schemars::schema_for!(SettingsLayer);
        writeln!(out, "{}", serde_json::to_string_pretty(&schema)?)?;
        return Ok(ExitCode::Clean);
    }

    let paths = ConfigPaths::discover(cli.config.clone());
    let settings = load_settings(&paths, &cli.settings.to_layer())?;

    match &cli.command {
        Commands::Resolve => {
            let resolved = resolve(&settings)?;
            write_resolved(out, cli.format, &settings, &resolved)?;
            Ok(ExitCode::Clean)
        }
        Commands::Init(args) => run_init(cli.format, args, &settings, out),
        Commands::Validate => run_validate(cli.format, &settings, out),
        Commands::Schema => Ok(ExitCode::Clean),
    }
}

#[derive(Serialize)]
struct InitReport<'a> {
    #[serde(flatten)]
    snapshot: &'a ConfigSnapshot,
    session: &'a SessionContext,
}

fn run_init(
    format: OutputFormat,
    args: &InitArgs,
    settings: &Settings,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let resolved = resolve(settings)?;

    let mut engine: Box<dyn Engine> = if args.dry_run {
        Box::new(DryRunEngine::new())
    } else if let Some(program) = &args.engine_cmd {
        Box::new(CommandEngine::new(program.clone(), args.engine_args.clone()))
    } else {
        return Err(Error::Config(
            "no engine configured: pass --dry-run or --engine-cmd".to_string(),
        ));
    };

    let options = InitOptions {
        verify_identity: !args.skip_identity,
    };
    let session = initialize_session(&resolved, engine.as_mut(), options)?;
    info!(catalog = %resolved.catalog, schema = %resolved.schema, "session initialized");

    match format {
        OutputFormat::Json => {
            let snapshot = ConfigSnapshot::new(settings, &resolved)?;
            let report = InitReport {
                snapshot: &snapshot,
                session: &session,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Summary => {
            write_summary(out, &resolved)?;
            for sql in &session.statements {
                writeln!(out, "executed:      {}", sql)?;
            }
            if let Some(current) = &session.current {
                writeln!(out, "current:       {}.{}", current.catalog, current.schema)?;
            }
        }
        OutputFormat::Env => write_env(out, &resolved)?,
    }
    Ok(ExitCode::Clean)
}

fn run_validate(format: OutputFormat, settings: &Settings, out: &mut dyn Write) -> Result<ExitCode> {
    let result = validate_settings(settings);
    let code = if result.is_valid() {
        ExitCode::Clean
    } else {
        ExitCode::ConfigError
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "valid": result.is_valid(),
                "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": result.warnings,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        OutputFormat::Summary | OutputFormat::Env => {
            for e in &result.errors {
                writeln!(out, "error: {}", e)?;
            }
            for w in &result.warnings {
                writeln!(out, "warning: {}", w)?;
            }
            if result.is_valid() {
                writeln!(out, "settings are valid")?;
            }
        }
    }
    Ok(code)
}

fn write_resolved(
    out: &mut dyn Write,
    format: OutputFormat,
    settings: &Settings,
    resolved: &ResolvedConfig,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let snapshot = ConfigSnapshot::new(settings, resolved)?;
            writeln!(out, "{}", snapshot.to_json()?)?;
        }
        OutputFormat::Summary => write_summary(out, resolved)?,
        OutputFormat::Env => write_env(out, resolved)?,
    }
    Ok(())
}

fn write_summary(out: &mut dyn Write, resolved: &ResolvedConfig) -> std::io::Result<()> {
    writeln!(out, "catalog:       {}", resolved.catalog)?;
    writeln!(out, "schema:        {}", resolved.schema)?;
    writeln!(out, "unity catalog: {}", on_off(resolved.use_unity_catalog))?;
    if resolved.volumes_overridden {
        writeln!(out, "volumes:       off (requires unity catalog)")?;
    } else {
        writeln!(out, "volumes:       {}", on_off(resolved.use_volumes))?;
    }
    writeln!(out, "storage root:  {}", resolved.paths.storage_root)?;
    writeln!(out, "data root:     {}", resolved.paths.data_root)?;
    writeln!(out, "top books:     {}", resolved.sampling.top_book_count)?;
    match resolved.sampling.fraction {
        Some(f) => writeln!(out, "sampling:      {}", f),
        None => writeln!(out, "sampling:      none"),
    }
}

fn write_env(out: &mut dyn Write, resolved: &ResolvedConfig) -> std::io::Result<()> {
    for (key, value) in resolved.env_pairs() {
        writeln!(out, "{}={}", key, shell_quote(&value))?;
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Single-quote values that a POSIX shell would otherwise split or expand.
fn shell_quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':'));
    if plain && !value.is_empty() {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}
