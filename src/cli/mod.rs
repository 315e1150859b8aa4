//! Command-line interface
//!
//! - tables: list the tables of the data source
//! - describe: list the columns of one table
//! - query: run one JSON query request read from stdin

mod args;
mod commands;
mod config;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command};
pub use commands::{describe, query, run, run_command, tables};
pub use config::SqlConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response};
pub use request::{PredicateStep, QueryRequest, TableRef};
