//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("dbkit")
        .about("Run SQL through a dbkit provider and generate record code")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Session configuration file (dbkit.toml)")
                .conflicts_with_all(["provider", "connection"])
                .global(true),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .value_name("NAME")
                .help("Provider name (default: sqlite)")
                .global(true),
        )
        .arg(
            Arg::new("connection")
                .long("connection")
                .value_name("STRING")
                .help("Connection string, e.g. \"Data Source=app.db\"")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (no type prefixes, no quotes)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log engine activity to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(sql_command("query", "Run a query and print its rows"))
        .subcommand(sql_command("exec", "Run a statement and print the affected row count"))
        .subcommand(sql_command(
            "scalar",
            "Run a query and print the first column of its first row",
        ))
        .subcommand(sql_command("describe", "Print the result columns of a query"))
        .subcommand(Command::new("scopes").about("List the scopes declared in --config"))
        .subcommand(
            Command::new("init")
                .about("Write a default dbkit.toml (or the --config path) if it does not exist"),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate record, query and layer sources from a database")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_name("FILE")
                        .help("Generator input (codegen.toml)"),
                ),
        )
}

fn sql_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("sql").required(true).value_name("SQL").help("Command text"))
        .arg(
            Arg::new("param")
                .long("param")
                .short('p')
                .value_name("NAME=VALUE")
                .action(ArgAction::Append)
                .help("Bind a parameter (repeatable)"),
        )
}
