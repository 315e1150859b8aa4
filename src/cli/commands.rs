//! CLI command implementations
//!
//! Every command follows the same sequence:
//! 1. Load and validate the configuration
//! 2. Apply the configured log level
//! 3. Open a session over the data source
//! 4. Build the query (or introspection table) and drain it with `fetch_row`
//! 5. Write one JSON response to stdout

use std::path::Path;

use serde_json::{json, Value};

use crate::context::QueryContext;
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope};
use crate::source::JsonFileOpener;

use super::args::Command;
use super::config::SqlConfig;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};
use super::request::QueryRequest;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = match cmd {
        Command::Tables { config, source } => tables(&config, source.as_deref())?,
        Command::Describe {
            config,
            source,
            table,
        } => describe(&config, source.as_deref(), &table)?,
        Command::Query { config, source } => {
            let request: QueryRequest = serde_json::from_value(read_request()?)?;
            query(&config, source.as_deref(), &request)?
        }
    };
    write_response(data)
}

/// List the tables of the data source
pub fn tables(config_path: &Path, source: Option<&str>) -> CliResult<Value> {
    let mut ctx = open_session(config_path, source)?;
    ctx.list_tables()?;
    let data = drain(&mut ctx)?;
    ctx.exit();
    Ok(data)
}

/// Describe the columns of one table
pub fn describe(config_path: &Path, source: Option<&str>, table: &str) -> CliResult<Value> {
    let mut ctx = open_session(config_path, source)?;
    ctx.describe_table(table)?;
    let data = drain(&mut ctx)?;
    ctx.exit();
    Ok(data)
}

/// Run one query request
pub fn query(config_path: &Path, source: Option<&str>, request: &QueryRequest) -> CliResult<Value> {
    let mut ctx = open_session(config_path, source)?;
    request.apply(&mut ctx)?;
    ctx.resolve_table(None)?;
    ctx.bind_all()?;

    let table = ctx
        .resolved_table()
        .map(|def| def.name.clone())
        .unwrap_or_default();
    let scope = ObservationScope::with_fields("QUERY", &[("table", table.as_str())]);
    let data = match drain(&mut ctx) {
        Ok(data) => data,
        Err(e) => {
            scope.fail(e.message());
            return Err(e);
        }
    };
    let rows = data["row_count"].to_string();
    scope.complete_with_fields(&[("rows", rows.as_str())]);

    ctx.exit();
    Ok(data)
}

fn open_session(config_path: &Path, source: Option<&str>) -> CliResult<QueryContext> {
    let config = SqlConfig::load(config_path)?;
    Logger::set_min_severity(config.severity());
    let path = config_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", path.as_str()), ("log_level", config.log_level.as_str())],
    );

    let opener = match config.base_dir() {
        Some(dir) => JsonFileOpener::with_base_dir(dir),
        None => JsonFileOpener::new(),
    };

    let mut ctx = QueryContext::with_options(config.session_options());
    ctx.open(&opener, source.unwrap_or(&config.data_source))?;
    Ok(ctx)
}

/// Fetches every remaining row of the session into a JSON table
fn drain(ctx: &mut QueryContext) -> CliResult<Value> {
    let columns: Vec<String> = ctx
        .bindings()
        .iter()
        .filter(|b| b.is_bound())
        .map(|b| b.name().to_string())
        .collect();

    let mut rows = Vec::new();
    for row in ctx.rows() {
        let row = row.map_err(CliError::from)?;
        let values: Vec<Value> = row.values.iter().map(|(_, v)| v.to_json()).collect();
        rows.push(Value::Array(values));
    }

    let row_count = rows.len();
    Ok(json!({
        "columns": columns,
        "rows": rows,
        "row_count": row_count,
    }))
}
