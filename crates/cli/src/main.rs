//! dbkit CLI: run SQL through a provider, or generate record code.
//!
//! - `dbkit [flags] query|exec|scalar|describe <SQL> [--param NAME=VALUE]...`
//! - `dbkit --config dbkit.toml scopes`
//! - `dbkit init`
//! - `dbkit generate --input codegen.toml`

mod codegen;
mod commands;
mod format;
mod value;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::ArgMatches;
use dbkit::{Command, Parameter, Session, SessionConfig, CONFIG_FILE_NAME};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{
    format_affected, format_columns, format_error, format_names, format_scalar, format_table,
    OutputMode,
};
use value::parse_param;

const DEFAULT_PROVIDER: &str = "sqlite";

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("verbose"));
    dbkit::sqlite::register();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    match run(&matches, output_mode) {
        Ok(formatted) => {
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&format!("{:#}", e), output_mode));
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dbkit_cli=debug,dbkit_engine=debug,dbkit_provider=debug,dbkit_sqlite=debug")
    } else {
        EnvFilter::new("dbkit_cli=warn,dbkit_engine=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<String> {
    let Some((name, sub)) = matches.subcommand() else {
        anyhow::bail!("No command given");
    };

    if name == "generate" {
        let input = sub
            .get_one::<String>("input")
            .context("--input is required")?;
        let config = codegen::GeneratorConfig::from_file(Path::new(input))?;
        let written = codegen::generate(&config)?;
        let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        return Ok(format_names(&files, mode));
    }

    if name == "init" {
        let path = matches
            .get_one::<String>("config")
            .map(String::as_str)
            .unwrap_or(CONFIG_FILE_NAME);
        SessionConfig::write_default_if_missing(Path::new(path))?;
        return Ok(format!("OK {}", path));
    }

    let mut session = open_session(matches)?;
    let result = dispatch(&mut session, name, sub, mode);
    settle(result, session.dispose())
}

/// The command's own error wins over a failure releasing the session.
fn settle(result: Result<String>, released: dbkit::Result<()>) -> Result<String> {
    let output = result?;
    released.context("Failed to release session")?;
    Ok(output)
}

fn open_session(matches: &ArgMatches) -> Result<Session> {
    let mut session = if let Some(path) = matches.get_one::<String>("config") {
        let config = SessionConfig::from_file(Path::new(path))?;
        Session::from_config(&config)?
    } else {
        let connection = matches
            .get_one::<String>("connection")
            .context("Either --config or --connection is required")?;
        let provider = matches
            .get_one::<String>("provider")
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROVIDER);
        Session::new(connection, provider)?
    };
    session.open().context("Failed to open connection")?;
    debug!(provider = session.provider_name(), "connected");
    Ok(session)
}

fn dispatch(session: &mut Session, name: &str, sub: &ArgMatches, mode: OutputMode) -> Result<String> {
    if name == "scopes" {
        return Ok(format_names(&session.scope_names(), mode));
    }

    let sql = sub.get_one::<String>("sql").context("SQL text is required")?;
    let params = sub
        .get_many::<String>("param")
        .map(|values| values.map(|p| parse_param(p)).collect::<Result<Vec<Parameter>, String>>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let command = Command::text(sql).with_parameters(&params);

    let formatted = match name {
        "query" => format_table(&session.fill_table(command)?, mode),
        "exec" => format_affected(session.execute_non_query(command)?, mode),
        "scalar" => format_scalar(session.execute_scalar(command)?.as_ref(), mode),
        "describe" => format_columns(&session.describe_columns(command)?, mode),
        other => anyhow::bail!("Unknown command '{}'", other),
    };
    Ok(formatted)
}
