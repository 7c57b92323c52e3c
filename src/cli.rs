// src/cli.rs
//! # Command-Line Interface / 命令行接口
//!
//! Argument parsing for the `specrun` binary and dispatch to its commands.
//!
//! `specrun` 二进制文件的参数解析以及命令分发。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub mod commands {
    pub mod list;
    pub mod run;
}

/// Options of the `run` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub json: Option<PathBuf>,
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(RunArgs),
    List,
}

pub fn build_cli() -> Command {
    Command::new("specrun")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs the engine's self-check specs and reports the outcome.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Execute every self-check spec")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("TOML project file with [defaults] and [engine] sections")
                        .value_name("CONFIG")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Number of specs to run at the same time")
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Write the run report as JSON to this path")
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .help("Log level for engine events (overridden by SPECRUN_LOG)")
                        .value_name("LEVEL")
                        .default_value("warn")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(Command::new("list").about("List the ids of every self-check test"))
}

pub fn parse_args() -> CliCommand {
    from_matches(&build_cli().get_matches())
}

pub fn from_matches(matches: &ArgMatches) -> CliCommand {
    match matches.subcommand() {
        Some(("run", run)) => CliCommand::Run(RunArgs {
            config: run.get_one::<PathBuf>("config").cloned(),
            jobs: run.get_one::<usize>("jobs").copied(),
            json: run.get_one::<PathBuf>("json").cloned(),
            log: run
                .get_one::<String>("log")
                .cloned()
                .unwrap_or_else(|| "warn".to_string()),
        }),
        // `subcommand_required` leaves `list` as the only other option.
        _ => CliCommand::List,
    }
}

/// Runs `command`. Returns whether everything passed.
pub fn process_command(command: CliCommand) -> Result<bool> {
    match command {
        CliCommand::Run(args) => commands::run::execute(args),
        CliCommand::List => {
            commands::list::execute();
            Ok(true)
        }
    }
}
