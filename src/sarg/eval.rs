//! Predicate evaluation against a row
//!
//! Comparisons coerce the textual constant to the type of the row value:
//! integers compare as integers (or as floats when the constant has a
//! fraction), floats compare numerically with exact bit equality, text and
//! binary compare byte-wise, datetimes chronologically. NULL only satisfies
//! `IS NULL`. LIKE sees binary values as their raw bytes, the same bytes
//! `=` and `<` compare.

use std::borrow::Cow;

use crate::binding::parse_bool;
use crate::errors::{SqlError, SqlResult};
use crate::source::{parse_datetime, RowAccess, Value};

use super::node::{like_regex, Comparison, SargNode, SargOp};

impl SargNode {
    /// Evaluates the subtree against a row.
    ///
    /// AND and OR short-circuit: the right operand is never evaluated once
    /// the left one decides the result.
    pub fn evaluate<R: RowAccess + ?Sized>(&self, row: &R) -> SqlResult<bool> {
        match self {
            SargNode::Comparison(cmp) => cmp.evaluate(row),
            SargNode::Constant(b) => Ok(*b),
            SargNode::And { left, right } => Ok(left.evaluate(row)? && right.evaluate(row)?),
            SargNode::Or { left, right } => Ok(left.evaluate(row)? || right.evaluate(row)?),
            SargNode::Not { child } => Ok(!child.evaluate(row)?),
        }
    }
}

impl Comparison {
    /// Evaluates this comparison against a row.
    pub fn evaluate<R: RowAccess + ?Sized>(&self, row: &R) -> SqlResult<bool> {
        let (_, value) = row
            .column(self.column())
            .ok_or_else(|| SqlError::unknown_column(self.column()))?;

        match self.op() {
            SargOp::IsNull => return Ok(value.is_null()),
            SargOp::IsNotNull => return Ok(!value.is_null()),
            _ => {}
        }

        if let Some(re) = self.pattern() {
            return Ok(!value.is_null() && re.is_match(&pattern_subject(value)));
        }

        let constant = self.constant();
        let ord = match value {
            Value::Null => return Ok(false),
            Value::Int(i) => match constant.trim().parse::<i64>() {
                Ok(c) => i.cmp(&c),
                Err(_) => {
                    return Ok(compare_floats(*i as f64, parse_f64(constant)?, self.op()));
                }
            },
            Value::Float(x) => return Ok(compare_floats(*x, parse_f64(constant)?, self.op())),
            Value::Bool(b) => {
                let c = parse_bool(constant)
                    .ok_or_else(|| SqlError::invalid_conversion(constant, "boolean"))?;
                b.cmp(&c)
            }
            Value::Text(s) => s.as_bytes().cmp(constant.as_bytes()),
            Value::DateTime(dt) => {
                let c = parse_datetime(constant)
                    .ok_or_else(|| SqlError::invalid_conversion(constant, "datetime"))?;
                dt.cmp(&c)
            }
            Value::Binary(bytes) => bytes.as_slice().cmp(constant.as_bytes()),
        };

        Ok(self.op().accepts(ord))
    }
}

/// Compares two floating values. Equality is exact bit equality; NaN never
/// orders.
pub fn compare_floats(a: f64, b: f64, op: SargOp) -> bool {
    match op {
        SargOp::Eq => a.to_bits() == b.to_bits(),
        SargOp::Ne => a.to_bits() != b.to_bits(),
        _ => a.partial_cmp(&b).map_or(false, |ord| op.accepts(ord)),
    }
}

/// Compares two literals, numerically when both parse as numbers and
/// byte-wise otherwise.
pub fn compare_constants(lhs: &str, op: SargOp, rhs: &str) -> SqlResult<bool> {
    if op.is_null_check() {
        return Err(SqlError::invalid_operator(op.symbol()));
    }
    if op.is_pattern() {
        let re = like_regex(rhs, op == SargOp::ILike)?;
        return Ok(re.is_match(lhs));
    }

    let (l, r) = (lhs.trim(), rhs.trim());
    if let (Ok(a), Ok(b)) = (l.parse::<i64>(), r.parse::<i64>()) {
        return Ok(op.accepts(a.cmp(&b)));
    }
    if let (Ok(a), Ok(b)) = (l.parse::<f64>(), r.parse::<f64>()) {
        return Ok(compare_floats(a, b, op));
    }
    Ok(op.accepts(lhs.as_bytes().cmp(rhs.as_bytes())))
}

/// Text a LIKE pattern is matched against
fn pattern_subject(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Text(s) => Cow::Borrowed(s.as_str()),
        Value::Binary(bytes) => String::from_utf8_lossy(bytes),
        other => Cow::Owned(other.to_string()),
    }
}

fn parse_f64(constant: &str) -> SqlResult<f64> {
    constant
        .trim()
        .parse::<f64>()
        .map_err(|_| SqlError::invalid_conversion(constant, "number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SqlErrorCode;
    use crate::source::{ColumnDef, ColumnType, RowView, TableDef};
    use chrono::NaiveDate;

    fn table() -> TableDef {
        TableDef::new(
            "T",
            vec![
                ColumnDef::new("id", ColumnType::LongInt),
                ColumnDef::new("name", ColumnType::Text),
                ColumnDef::new("price", ColumnType::Double),
                ColumnDef::new("active", ColumnType::Boolean),
                ColumnDef::new("created", ColumnType::DateTime),
                ColumnDef::new("note", ColumnType::Memo),
                ColumnDef::new("blob", ColumnType::Binary),
            ],
        )
    }

    fn row() -> Vec<Value> {
        vec![
            Value::Int(2),
            Value::Text("b".into()),
            Value::Float(0.1 + 0.2),
            Value::Bool(true),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 6, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            ),
            Value::Null,
            Value::Binary(b"AB".to_vec()),
        ]
    }

    fn eval(column: &str, op: &str, constant: &str) -> SqlResult<bool> {
        let def = table();
        let values = row();
        let view = RowView::new(&def, &values);
        let cmp = Comparison::new(column, SargOp::from_token(op)?, constant)?;
        SargNode::Comparison(cmp).evaluate(&view)
    }

    #[test]
    fn test_integer_comparisons() {
        assert!(eval("id", ">", "1").unwrap());
        assert!(eval("id", "=", "2").unwrap());
        assert!(!eval("id", "<", "2").unwrap());
        assert!(eval("id", "<", "2.5").unwrap());
    }

    #[test]
    fn test_text_is_bytewise() {
        assert!(eval("name", "!=", "c").unwrap());
        assert!(eval("name", ">", "a").unwrap());
        assert!(!eval("name", "=", "B").unwrap());
    }

    #[test]
    fn test_float_equality_is_exact() {
        assert!(!eval("price", "=", "0.3").unwrap());
        assert!(eval("price", ">", "0.3").unwrap());
        assert!(eval("price", "=", "0.30000000000000004").unwrap());
    }

    #[test]
    fn test_bool_and_datetime() {
        assert!(eval("active", "=", "true").unwrap());
        assert!(eval("active", "<>", "0").unwrap());
        assert!(eval("created", ">", "2024-01-01").unwrap());
        assert!(eval("created", "<", "06/02/2024").unwrap());
    }

    #[test]
    fn test_null_handling() {
        assert!(!eval("note", "=", "x").unwrap());
        assert!(!eval("note", "<>", "x").unwrap());
        assert!(eval("note", "is null", "").unwrap());
        assert!(!eval("id", "is null", "").unwrap());
        assert!(!eval("note", "like", "%").unwrap());
    }

    #[test]
    fn test_like() {
        assert!(eval("name", "like", "_").unwrap());
        assert!(eval("id", "like", "2%").unwrap());
        assert!(eval("name", "ilike", "B").unwrap());
        assert!(!eval("name", "like", "B").unwrap());
    }

    #[test]
    fn test_binary_like_agrees_with_equality() {
        assert!(eval("blob", "=", "AB").unwrap());
        assert!(eval("blob", "like", "AB").unwrap());
        assert!(eval("blob", "like", "A%").unwrap());
        assert!(!eval("blob", "like", "4142").unwrap());
        assert!(eval("blob", "<", "AC").unwrap());
    }

    #[test]
    fn test_unknown_column_fails_evaluation() {
        let err = eval("email", "=", "x").unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::UnknownColumn);
    }

    #[test]
    fn test_bad_constant_fails_evaluation() {
        let err = eval("id", "=", "abc").unwrap_err();
        assert_eq!(err.code(), SqlErrorCode::InvalidConversion);
    }

    #[test]
    fn test_compare_constants() {
        assert!(compare_constants("1", SargOp::Eq, "1").unwrap());
        assert!(compare_constants("10", SargOp::Gt, "9").unwrap());
        assert!(!compare_constants("10", SargOp::Gt, "9x").unwrap());
        assert!(compare_constants("1.5", SargOp::Lt, "2").unwrap());
        assert!(compare_constants("abc", SargOp::Like, "a%").unwrap());
        assert!(compare_constants("x", SargOp::IsNull, "").is_err());
    }
}
