//! Query requests read by `mdbsql query`
//!
//! ```json
//! {
//!   "tables": ["Orders"],
//!   "columns": ["id", "name"],
//!   "where": [
//!     {"column": "id", "op": ">", "value": 1},
//!     {"column": "name", "op": "!=", "value": "c"},
//!     "and"
//!   ],
//!   "limit": 10
//! }
//! ```
//!
//! `where` is in postfix order, the order a parser emits it: operands
//! first, then the combinator joining them.

use serde::Deserialize;
use serde_json::Value;

use crate::context::QueryContext;
use crate::errors::{SqlError, SqlResult};

/// A selected table, by name or with an alias
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    Name(String),
    Aliased { name: String, alias: String },
}

/// One step of a postfix predicate
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredicateStep {
    /// `"and"`, `"or"` or `"not"`
    Combinator(String),
    Comparison {
        column: String,
        op: String,
        value: Value,
    },
    NullCheck {
        column: String,
        is_null: bool,
    },
    /// Literal-only comparison such as `1 = 1`
    Constant { lhs: Value, op: String, rhs: Value },
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub tables: Vec<TableRef>,
    /// Column names; empty or `["*"]` selects every column
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, rename = "where")]
    pub predicate: Vec<PredicateStep>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl QueryRequest {
    /// Replays the request into a session as a sequence of build calls
    pub fn apply(&self, ctx: &mut QueryContext) -> SqlResult<()> {
        for table in &self.tables {
            match table {
                TableRef::Name(name) => ctx.add_table(name)?,
                TableRef::Aliased { name, alias } => ctx.add_table_alias(name, alias)?,
            }
        }

        if self.columns.is_empty() {
            ctx.select_all_columns();
        }
        for column in &self.columns {
            if column == "*" {
                ctx.select_all_columns();
            } else {
                ctx.add_column(column)?;
            }
        }

        for step in &self.predicate {
            match step {
                PredicateStep::Combinator(word) => match word.to_ascii_lowercase().as_str() {
                    "and" => ctx.add_and()?,
                    "or" => ctx.add_or()?,
                    "not" => ctx.add_not()?,
                    _ => {
                        return Err(SqlError::malformed_predicate(format!(
                            "unknown combinator '{}'",
                            word
                        )))
                    }
                },
                PredicateStep::Comparison { column, op, value } => {
                    ctx.add_comparison(column, op, &literal(value))?
                }
                PredicateStep::NullCheck { column, is_null } => {
                    ctx.add_null_check(column, *is_null)?
                }
                PredicateStep::Constant { lhs, op, rhs } => {
                    ctx.add_constant_comparison(&literal(lhs), op, &literal(rhs))?
                }
            }
        }
        if !self.predicate.is_empty() {
            ctx.finalize()?;
        }

        if let Some(limit) = &self.limit {
            ctx.add_limit(&literal(limit))?;
        }
        Ok(())
    }
}

/// Renders a JSON scalar as the textual constant a parser would emit
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
