//! The query session
//!
//! A `QueryContext` accumulates one query at a time: tables and columns in
//! the catalog, the predicate on the operand stack, output bindings, and an
//! optional row limit. Resolving a table starts an execution; `fetch_row`
//! then advances it one matched row at a time.
//!
//! Every fallible call clears the last error on entry and records its own
//! failure, so `has_error` always describes the most recent operation.

use crate::binding::{BindTarget, ColumnBinding, OutputType, OutputValue};
use crate::catalog::Catalog;
use crate::errors::{SqlError, SqlErrorCode, SqlResult};
use crate::executor::{add_temp_column, FetchOutcome, RowSnapshot, Scan, ScanState};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::sarg::{SargBuilder, SargNode};
use crate::source::{ColumnType, DataSource, MemoryTable, SourceOpener, TableDef, Value};

use super::options::{ErrorSlot, SessionOptions};
use super::rows::Rows;

/// Name of the temporary table produced by `list_tables`
pub const TABLE_LIST_NAME: &str = "MSysTables";

/// One query session over an optional data source
pub struct QueryContext {
    source: Option<Box<dyn DataSource>>,
    catalog: Catalog,
    builder: SargBuilder,
    scan: Option<Scan>,
    /// Rows matched by the current query execution; introspection scans
    /// keep their own count
    row_count: u64,
    row_limit: Option<u64>,
    max_rows: u64,
    text_capacity: usize,
    error: ErrorSlot,
}

impl QueryContext {
    /// Creates a session with default options
    pub fn init() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        let capacity = options.error_capacity.to_string();
        log_event_with_fields(Event::SessionInit, &[("error_capacity", &capacity)]);

        Self {
            source: None,
            catalog: Catalog::new(),
            builder: SargBuilder::new(),
            scan: None,
            row_count: 0,
            row_limit: None,
            max_rows: options.max_rows,
            text_capacity: options.text_capacity,
            error: ErrorSlot::new(options.error_capacity),
        }
    }

    // ===== Session =====

    /// Opens a data source by name, replacing any open one.
    pub fn open(&mut self, opener: &dyn SourceOpener, name: &str) -> SqlResult<()> {
        let result = opener.open(name).map_err(SqlError::from);
        match result {
            Ok(source) => {
                self.attach(source);
                self.error.clear();
                Ok(())
            }
            Err(e) => {
                log_event_with_fields(
                    Event::SourceOpenFailed,
                    &[("name", name), ("reason", e.message())],
                );
                self.error.set(&e);
                Err(e)
            }
        }
    }

    /// Installs an already-open data source, dropping query state that
    /// referred to the previous one
    pub fn attach(&mut self, source: Box<dyn DataSource>) {
        log_event_with_fields(Event::SourceOpened, &[("name", source.name())]);
        self.scan = None;
        self.row_count = 0;
        self.source = Some(source);
    }

    pub fn data_source(&self) -> Option<&dyn DataSource> {
        self.source.as_deref()
    }

    /// Clears all query state. The data source and session options stay.
    pub fn reset(&mut self) {
        self.catalog.clear();
        self.builder.clear();
        self.scan = None;
        self.row_count = 0;
        self.row_limit = None;
        self.error.clear();
        log_event(Event::SessionReset);
    }

    /// Resets the query and releases the data source
    pub fn close(&mut self) {
        self.reset();
        if let Some(source) = self.source.take() {
            log_event_with_fields(Event::SessionClose, &[("name", source.name())]);
        }
    }

    /// Ends the session
    pub fn exit(mut self) {
        self.close();
    }

    // ===== Build =====

    pub fn add_table(&mut self, name: &str) -> SqlResult<()> {
        let result = self.catalog.add_table(name);
        self.track(result)
    }

    /// Adds a table under an alias; an empty alias means the table name
    pub fn add_table_alias(&mut self, name: &str, alias: &str) -> SqlResult<()> {
        let result = self.catalog.add_table_alias(name, alias);
        self.track(result)
    }

    pub fn add_column(&mut self, name: &str) -> SqlResult<()> {
        let result = self.catalog.add_column(name);
        self.track(result)
    }

    pub fn select_all_columns(&mut self) {
        self.catalog.select_all_columns();
    }

    /// Pushes a `column <op> constant` comparison onto the operand stack
    pub fn add_comparison(&mut self, column: &str, op: &str, constant: &str) -> SqlResult<()> {
        let result = self.builder.add_comparison(column, op, constant);
        self.track(result)
    }

    pub fn add_null_check(&mut self, column: &str, is_null: bool) -> SqlResult<()> {
        let result = self.builder.add_null_check(column, is_null);
        self.track(result)
    }

    /// Pushes the folded result of a literal-only comparison
    pub fn add_constant_comparison(&mut self, lhs: &str, op: &str, rhs: &str) -> SqlResult<()> {
        let result = self.builder.add_constant_comparison(lhs, op, rhs);
        self.track(result)
    }

    pub fn add_and(&mut self) -> SqlResult<()> {
        let result = self.builder.add_and();
        self.track(result)
    }

    pub fn add_or(&mut self) -> SqlResult<()> {
        let result = self.builder.add_or();
        self.track(result)
    }

    pub fn add_not(&mut self) -> SqlResult<()> {
        let result = self.builder.add_not();
        self.track(result)
    }

    /// Installs the single remaining operand as the query predicate
    pub fn finalize(&mut self) -> SqlResult<()> {
        let result = self.builder.finalize();
        if result.is_ok() {
            let nodes = self
                .builder
                .predicate()
                .map_or(0, SargNode::node_count)
                .to_string();
            log_event_with_fields(Event::PredicateFinalized, &[("nodes", &nodes)]);
        }
        self.track(result)
    }

    /// Sets the row limit from its textual form.
    ///
    /// Only non-negative integers are accepted.
    pub fn add_limit(&mut self, text: &str) -> SqlResult<()> {
        let result = text
            .trim()
            .parse::<u64>()
            .map_err(|_| SqlError::invalid_limit(text));
        let result = result.map(|limit| self.row_limit = Some(limit));
        self.track(result)
    }

    /// Sets the session-wide cap on rows per execution, 0 for unbounded
    pub fn set_max_rows(&mut self, max_rows: u64) {
        self.max_rows = max_rows;
    }

    /// Attaches an output target to a selected column
    pub fn bind(&mut self, column: &str, target: BindTarget, output_type: OutputType) -> SqlResult<()> {
        let table = self.scan.as_ref().map(Scan::definition);
        let result = self.catalog.bind(column, target, output_type, table);
        self.track(result)
    }

    /// Binds every column of the resolved table that has no target yet
    pub fn bind_all(&mut self) -> SqlResult<()> {
        let result = match &self.scan {
            Some(scan) => {
                self.catalog.bind_all(scan.definition(), self.text_capacity);
                Ok(())
            }
            None => Err(SqlError::no_table("bind_all requires a resolved table")),
        };
        self.track(result)
    }

    /// Registers a synthetic column on a table definition
    pub fn add_temp_column(
        &mut self,
        table: &mut TableDef,
        col_num: usize,
        name: &str,
        col_type: ColumnType,
        size: usize,
        is_fixed: bool,
    ) -> SqlResult<()> {
        let result = add_temp_column(table, col_num, name, col_type, size, is_fixed);
        self.track(result)
    }

    // ===== Execute =====

    /// Resolves a table against the data source and starts an execution.
    ///
    /// With no name, the single selected table is used. Selected columns are
    /// checked against the physical schema.
    pub fn resolve_table(&mut self, name: Option<&str>) -> SqlResult<()> {
        let result = self.open_scan(name);
        self.record(result)
    }

    fn open_scan(&mut self, name: Option<&str>) -> SqlResult<()> {
        let source = self.source.as_ref().ok_or_else(SqlError::no_data_source)?;

        let table_name = match name {
            Some(name) => self
                .catalog
                .table(name)
                .map_or(name, |t| t.name.as_str())
                .to_string(),
            None => match self.catalog.tables() {
                [only] => only.name.clone(),
                [] => return Err(SqlError::no_table("no table selected")),
                tables => {
                    return Err(SqlError::no_table(format!(
                        "{} tables selected, joins are not supported",
                        tables.len()
                    )))
                }
            },
        };

        let reader = source.open_table(&table_name)?;
        self.catalog.resolve_columns(reader.definition())?;

        let columns = reader.definition().num_columns().to_string();
        log_event_with_fields(
            Event::TableResolved,
            &[("table", &table_name), ("columns", &columns)],
        );
        self.scan = Some(Scan::new(reader));
        self.row_count = 0;
        Ok(())
    }

    /// Fetches the next matching row into the bound targets.
    pub fn fetch_row(&mut self) -> SqlResult<FetchOutcome> {
        let result = self.advance();
        if let Err(e) = &result {
            log_event_with_fields(
                Event::FetchFailed,
                &[("code", e.code().code()), ("reason", e.message())],
            );
        }
        self.record(result)
    }

    fn advance(&mut self) -> SqlResult<FetchOutcome> {
        let filtered = self.scan.as_ref().map_or(true, Scan::is_filtered);
        let pending = self.builder.pending();
        if filtered && pending > 0 {
            return Err(SqlError::predicate_not_finalized(pending));
        }
        let limit = if filtered { self.effective_limit() } else { None };
        let scan = self
            .scan
            .as_mut()
            .ok_or_else(|| SqlError::no_table("fetch requires a resolved table"))?;

        let was_finished = scan.is_finished();
        let outcome = scan.fetch(self.builder.predicate(), self.catalog.columns(), limit)?;
        let count = scan.row_count();
        if filtered {
            self.row_count = count;
        }

        let rows = count.to_string();
        match outcome {
            FetchOutcome::Row => log_event_with_fields(Event::RowFetched, &[("row", &rows)]),
            FetchOutcome::Exhausted if !was_finished => {
                log_event_with_fields(Event::ScanExhausted, &[("rows", &rows)])
            }
            FetchOutcome::LimitReached => {
                log_event_with_fields(Event::ScanLimitReached, &[("rows", &rows)])
            }
            FetchOutcome::Exhausted => {}
        }
        Ok(outcome)
    }

    /// The smaller of `LIMIT` and the session row cap
    pub fn effective_limit(&self) -> Option<u64> {
        let max_rows = (self.max_rows > 0).then_some(self.max_rows);
        match (self.row_limit, max_rows) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Rows matched in the current query execution. Introspection does not
    /// change it.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.row_limit
    }

    pub fn scan_state(&self) -> Option<ScanState> {
        self.scan.as_ref().map(Scan::state)
    }

    /// Definition of the resolved table
    pub fn resolved_table(&self) -> Option<&TableDef> {
        self.scan.as_ref().map(Scan::definition)
    }

    /// Iterates matched rows as snapshots of the bound columns
    pub fn rows(&mut self) -> Rows<'_> {
        Rows::new(self)
    }

    /// Copies the current contents of every bound column
    pub fn snapshot(&self) -> RowSnapshot {
        RowSnapshot {
            values: self
                .catalog
                .columns()
                .iter()
                .filter_map(|b| b.value().map(|v| (b.name().to_string(), v)))
                .collect(),
        }
    }

    // ===== Introspection =====

    /// Lists the physical tables and installs the list as the resolved
    /// table, one `Tables` column per row.
    pub fn list_tables(&mut self) -> SqlResult<Vec<String>> {
        let result = self.build_table_list();
        self.record(result)
    }

    fn build_table_list(&mut self) -> SqlResult<Vec<String>> {
        let source = self.source.as_ref().ok_or_else(SqlError::no_data_source)?;
        let names = source.table_names()?;

        let mut def = TableDef::new(TABLE_LIST_NAME, Vec::new());
        add_temp_column(&mut def, 0, "Tables", ColumnType::Text, 255, false)?;

        let mut table = MemoryTable::with_columns(def.name.clone(), def.columns);
        for name in &names {
            table.push_row(vec![Value::Text(name.clone())]);
        }
        self.install_introspection(table);
        Ok(names)
    }

    /// Describes a table's columns and installs the description as the
    /// resolved table, one row per physical column.
    pub fn describe_table(&mut self, name: &str) -> SqlResult<TableDef> {
        let result = self.build_description(name);
        self.record(result)
    }

    fn build_description(&mut self, name: &str) -> SqlResult<TableDef> {
        let source = self.source.as_ref().ok_or_else(SqlError::no_data_source)?;
        let physical = source.table_definition(name)?;

        let mut def = TableDef::new(physical.name.clone(), Vec::new());
        add_temp_column(&mut def, 0, "Column Name", ColumnType::Text, 30, false)?;
        add_temp_column(&mut def, 1, "Type", ColumnType::Text, 20, false)?;
        add_temp_column(&mut def, 2, "Size", ColumnType::LongInt, 0, true)?;

        let mut table = MemoryTable::with_columns(def.name.clone(), def.columns);
        for col in &physical.columns {
            table.push_row(vec![
                Value::Text(col.name.clone()),
                Value::Text(col.col_type.type_name().to_string()),
                Value::Int(col.size as i64),
            ]);
        }
        self.install_introspection(table);
        Ok(physical)
    }

    fn install_introspection(&mut self, table: MemoryTable) {
        let scan = Scan::unfiltered(Box::new(table));
        self.catalog.select_only_all();
        self.catalog.bind_all(scan.definition(), self.text_capacity);
        self.scan = Some(scan);
    }

    // ===== Diagnostics =====

    /// Renders the query state: tables, columns, limit and predicate
    pub fn dump(&self) -> String {
        let mut out = String::from("Tables:\n");
        for table in self.catalog.tables() {
            if table.alias.eq_ignore_ascii_case(&table.name) {
                out.push_str(&format!("  {}\n", table.name));
            } else {
                out.push_str(&format!("  {} AS {}\n", table.name, table.alias));
            }
        }

        out.push_str("Columns:\n");
        if self.catalog.is_select_all() {
            out.push_str("  *\n");
        }
        for column in self.catalog.columns() {
            out.push_str(&format!("  {}\n", column.name()));
        }

        if let Some(limit) = self.row_limit {
            out.push_str(&format!("Limit: {}\n", limit));
        }

        out.push_str("Predicate:\n");
        match self.builder.predicate() {
            Some(predicate) => predicate.dump_node(1, &mut out),
            None => out.push_str("  (all rows)\n"),
        }
        out
    }

    pub fn has_error(&self) -> bool {
        self.error.error().is_some()
    }

    /// Text of the most recent failure, bounded by the error capacity
    pub fn last_error(&self) -> Option<&str> {
        self.error.text()
    }

    pub fn last_error_code(&self) -> Option<SqlErrorCode> {
        self.error.error().map(SqlError::code)
    }

    // ===== Accessors =====

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn bindings(&self) -> &[ColumnBinding] {
        self.catalog.columns()
    }

    pub fn predicate(&self) -> Option<&SargNode> {
        self.builder.predicate()
    }

    /// Current value of a bound column
    pub fn value(&self, column: &str) -> Option<OutputValue> {
        self.catalog.column(column).and_then(ColumnBinding::value)
    }

    /// Records the outcome of a build call
    fn track<T>(&mut self, result: SqlResult<T>) -> SqlResult<T> {
        if let Err(e) = &result {
            log_event_with_fields(
                Event::BuildRejected,
                &[("code", e.code().code()), ("reason", e.message())],
            );
        }
        self.record(result)
    }

    fn record<T>(&mut self, result: SqlResult<T>) -> SqlResult<T> {
        match &result {
            Ok(_) => self.error.clear(),
            Err(e) => self.error.set(e),
        }
        result
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::OutputBuffer;
    use crate::source::{ColumnDef, MemorySource};

    fn source() -> Box<dyn DataSource> {
        let mut t = MemoryTable::with_columns(
            "T",
            vec![
                ColumnDef::new("id", ColumnType::LongInt),
                ColumnDef::with_size("name", ColumnType::Text, 10),
            ],
        );
        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            t.push_row(vec![Value::Int(id), Value::Text(name.into())]);
        }
        Box::new(
            MemorySource::new("test")
                .with_table(t)
                .with_table(MemoryTable::with_columns(
                    "U",
                    vec![ColumnDef::new("x", ColumnType::Int)],
                )),
        )
    }

    fn session() -> QueryContext {
        let mut ctx = QueryContext::init();
        ctx.attach(source());
        ctx
    }

    #[test]
    fn test_error_tracking() {
        let mut ctx = session();
        ctx.add_table("T").unwrap();
        assert!(!ctx.has_error());

        let err = ctx.add_table("t").unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::DuplicateTable);
        assert!(ctx.has_error());
        assert_eq!(ctx.last_error_code(), Some(SqlErrorCode::DuplicateTable));
        assert_eq!(ctx.catalog().tables().len(), 1);

        ctx.add_column("id").unwrap();
        assert!(!ctx.has_error());
        assert!(ctx.last_error().is_none());
    }

    #[test]
    fn test_add_limit() {
        let mut ctx = session();
        ctx.add_limit(" 5 ").unwrap();
        assert_eq!(ctx.row_limit(), Some(5));

        for bad in ["-1", "abc", "", "2.5"] {
            let err = ctx.add_limit(bad).unwrap_err();
            assert_eq!(err.code(), SqlErrorCode::InvalidLimit);
        }
        assert_eq!(ctx.row_limit(), Some(5));
    }

    #[test]
    fn test_effective_limit() {
        let mut ctx = session();
        assert_eq!(ctx.effective_limit(), None);
        ctx.set_max_rows(3);
        assert_eq!(ctx.effective_limit(), Some(3));
        ctx.add_limit("10").unwrap();
        assert_eq!(ctx.effective_limit(), Some(3));
        ctx.add_limit("1").unwrap();
        assert_eq!(ctx.effective_limit(), Some(1));
    }

    #[test]
    fn test_resolve_requires_source_and_single_table() {
        let mut ctx = QueryContext::init();
        let err = ctx.resolve_table(Some("T")).unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::NoDataSource);

        ctx.attach(source());
        assert_eq!(ctx.resolve_table(None).unwrap_err().code(), SqlErrorCode::NoTable);

        ctx.add_table("T").unwrap();
        ctx.add_table("U").unwrap();
        assert_eq!(ctx.resolve_table(None).unwrap_err().code(), SqlErrorCode::NoTable);

        assert_eq!(
            ctx.resolve_table(Some("missing")).unwrap_err().code(),
            SqlErrorCode::UnknownTable
        );
        ctx.resolve_table(Some("u")).unwrap();
        assert_eq!(ctx.resolved_table().unwrap().name, "U");
    }

    #[test]
    fn test_resolve_by_alias() {
        let mut ctx = session();
        ctx.add_table_alias("T", "t1").unwrap();
        ctx.resolve_table(Some("t1")).unwrap();
        assert_eq!(ctx.resolved_table().unwrap().name, "T");
    }

    #[test]
    fn test_resolve_rejects_unknown_selected_column() {
        let mut ctx = session();
        ctx.add_table("T").unwrap();
        ctx.add_column("email").unwrap();
        let err = ctx.resolve_table(None).unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
        assert!(ctx.scan_state().is_none());
    }

    #[test]
    fn test_fetch_without_table() {
        let mut ctx = session();
        assert_eq!(ctx.fetch_row().unwrap_err().code(), SqlErrorCode::NoTable);
        assert_eq!(ctx.bind_all().unwrap_err().code(), SqlErrorCode::NoTable);
    }

    #[test]
    fn test_fetch_with_pending_operands() {
        let mut ctx = session();
        ctx.add_table("T").unwrap();
        ctx.add_comparison("id", "=", "1").unwrap();
        ctx.resolve_table(None).unwrap();

        let err = ctx.fetch_row().unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::PredicateNotFinalized);
        assert_eq!(ctx.row_count(), 0);

        ctx.finalize().unwrap();
        assert_eq!(ctx.fetch_row().unwrap(), FetchOutcome::Row);
    }

    #[test]
    fn test_bind_and_fetch() {
        let mut ctx = session();
        ctx.add_table("T").unwrap();
        ctx.add_column("name").unwrap();
        let name = OutputBuffer::new();
        ctx.bind("name", BindTarget::new(name.clone(), 16), OutputType::Text)
            .unwrap();
        ctx.add_comparison("id", "=", "3").unwrap();
        ctx.finalize().unwrap();
        ctx.resolve_table(None).unwrap();

        assert_eq!(ctx.fetch_row().unwrap(), FetchOutcome::Row);
        assert_eq!(name.get(), OutputValue::Text("c".into()));
        assert_eq!(ctx.value("NAME"), Some(OutputValue::Text("c".into())));
        assert_eq!(ctx.fetch_row().unwrap(), FetchOutcome::Exhausted);
        assert_eq!(ctx.scan_state(), Some(ScanState::Exhausted));
        assert_eq!(ctx.fetch_row().unwrap(), FetchOutcome::Exhausted);
        assert_eq!(ctx.scan_state(), Some(ScanState::Done));
        assert_eq!(ctx.row_count(), 1);
    }

    #[test]
    fn test_bind_unselected_column() {
        let mut ctx = session();
        let err = ctx
            .bind("id", BindTarget::new(OutputBuffer::new(), 8), OutputType::Int32)
            .unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
    }

    #[test]
    fn test_list_tables() {
        let mut ctx = session();
        let names = ctx.list_tables().unwrap();
        assert_eq!(names, vec!["T".to_string(), "U".to_string()]);

        let rows: Vec<_> = ctx.rows().collect::<SqlResult<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Tables"), Some(&OutputValue::Text("T".into())));
    }

    #[test]
    fn test_describe_table_keeps_predicate() {
        let mut ctx = session();
        ctx.add_comparison("id", "=", "99").unwrap();
        ctx.finalize().unwrap();

        let def = ctx.describe_table("T").unwrap();
        assert_eq!(def.num_columns(), 2);
        assert!(ctx.predicate().is_some());

        let rows: Vec<_> = ctx.rows().collect::<SqlResult<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["Column Name", "Type", "Size"]
        );
        assert_eq!(rows[1].get("Size").and_then(OutputValue::as_i64), Some(10));
    }

    #[test]
    fn test_introspection_without_source() {
        let mut ctx = QueryContext::init();
        assert_eq!(ctx.list_tables().unwrap_err().code(), SqlErrorCode::NoDataSource);
        assert_eq!(
            ctx.describe_table("T").unwrap_err().code(),
            SqlErrorCode::NoDataSource
        );
    }

    #[test]
    fn test_reset_keeps_source() {
        let mut ctx = session();
        ctx.add_table("T").unwrap();
        ctx.add_limit("2").unwrap();
        ctx.resolve_table(None).unwrap();
        let _ = ctx.add_table("T");

        ctx.reset();
        assert!(ctx.catalog().tables().is_empty());
        assert!(ctx.row_limit().is_none());
        assert!(ctx.scan_state().is_none());
        assert!(!ctx.has_error());
        assert!(ctx.data_source().is_some());

        ctx.close();
        assert!(ctx.data_source().is_none());
    }

    #[test]
    fn test_dump() {
        let mut ctx = session();
        ctx.add_table_alias("T", "t1").unwrap();
        ctx.add_column("id").unwrap();
        ctx.add_null_check("name", true).unwrap();
        ctx.add_not().unwrap();
        ctx.finalize().unwrap();
        ctx.add_limit("4").unwrap();

        assert_eq!(
            ctx.dump(),
            "Tables:\n  T AS t1\nColumns:\n  id\nLimit: 4\nPredicate:\n  NOT\n    name IS NULL\n"
        );
    }
}
