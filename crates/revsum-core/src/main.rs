//! revsum - resolve notebook session configuration and select the engine namespace.

use clap::Parser;
use revsum_common::OutputFormat;
use revsum_core::cli::Cli;
use revsum_core::exit_codes::ExitCode;
use revsum_core::{commands, logging};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbosity(), cli.log_json);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = match commands::run(&cli, &mut out) {
        Ok(code) => code,
        Err(e) => {
            let code = ExitCode::from(&e);
            if cli.format == OutputFormat::Json {
                let body = serde_json::json!({
                    "error": { "code": e.code(), "message": e.to_string() },
                    "exit_code": code.as_i32(),
                });
                println!("{}", body);
            }
            eprintln!("error: {}", e);
            code
        }
    };
    drop(out);
    std::process::exit(code.as_i32());
}
