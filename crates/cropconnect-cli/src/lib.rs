// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `cropconnect` operations CLI: database setup, seeding accounts and
//! listings, and operator-driven contract transitions against the same
//! lifecycle rules the HTTP API enforces.

mod actions;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{error::ErrorKind, ArgAction, Parser, Subcommand};
use cropconnect_core::{ExitCode, MachineError, DEFAULT_DB_PATH, ENV_CROPCONNECT_DB_PATH};
use cropconnect_lifecycle::LifecycleError;
use cropconnect_store::StoreError;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::commands::{ContractCommand, DbCommand, ListingCommand, UserCommand};

#[derive(Parser)]
#[command(name = "cropconnect")]
#[command(about = "CropConnect marketplace operations CLI")]
#[command(
    after_help = "Environment:\n  CROPCONNECT_DB_PATH   Database file used when --db is omitted\n  RUST_LOG              Log filter override"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Database file; defaults to $CROPCONNECT_DB_PATH, then artifacts/cropconnect.sqlite.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Listing {
        #[command(subcommand)]
        command: ListingCommand,
    },
    Contract {
        #[command(subcommand)]
        command: ContractCommand,
    },
    /// Print the OpenAPI document served at /v1/openapi.json.
    Openapi,
}

#[derive(Clone, Copy)]
pub(crate) struct OutputMode {
    pub json: bool,
}

#[derive(Debug)]
pub(crate) struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    pub(crate) fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }

    pub(crate) fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    pub(crate) fn storage(message: String) -> Self {
        Self {
            exit_code: ExitCode::Storage,
            machine: MachineError::new("storage_unavailable", &message),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.machine = self.machine.with_detail(key, value);
        self
    }
}

impl From<LifecycleError> for CliError {
    fn from(err: LifecycleError) -> Self {
        let exit_code = match &err {
            LifecycleError::PersistenceFailure(_) => ExitCode::Storage,
            _ => ExitCode::Rejected,
        };
        Self {
            exit_code,
            machine: MachineError::new(err.kind(), &err.detail()),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::storage(err.to_string()).with_detail("store_code", err.code.as_str())
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError::usage("invalid command line arguments")
                    .with_detail("error", &err.to_string()));
            }
        },
    };
    init_logging(cli.quiet, cli.verbose, cli.json);
    let output_mode = OutputMode { json: cli.json };
    let db_path = cli.db.unwrap_or_else(|| {
        std::env::var(ENV_CROPCONNECT_DB_PATH)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
    });

    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    match command {
        Commands::Db { command } => match command {
            DbCommand::Init => actions::db_init(&db_path, output_mode),
            DbCommand::Inspect => actions::db_inspect(&db_path, output_mode),
        },
        Commands::User { command } => actions::run_user_command(command, &db_path, output_mode),
        Commands::Listing { command } => {
            actions::run_listing_command(command, &db_path, output_mode)
        }
        Commands::Contract { command } => {
            actions::run_contract_command(command, &db_path, output_mode)
        }
        Commands::Openapi => actions::print_openapi(output_mode),
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging(quiet: bool, verbose: u8, json: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

pub(crate) fn emit_ok(output_mode: OutputMode, payload: &Value) -> Result<(), CliError> {
    let text = if output_mode.json {
        serde_json::to_string(payload)
    } else {
        serde_json::to_string_pretty(payload)
    }
    .map_err(|e| CliError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lifecycle_errors_keep_their_kind() {
        let err = CliError::from(LifecycleError::IllegalTransition {
            from: cropconnect_model::ContractStatus::Delivered,
            to: cropconnect_model::ContractStatus::Pending,
        });
        assert_eq!(err.exit_code, ExitCode::Rejected);
        assert_eq!(err.machine.code, "illegal_transition");

        let err = CliError::from(LifecycleError::PersistenceFailure("disk".to_string()));
        assert_eq!(err.exit_code, ExitCode::Storage);
    }
}
