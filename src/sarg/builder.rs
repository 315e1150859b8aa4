//! Operand-stack construction of the predicate tree
//!
//! The parser emits operands before the combinator that joins them, so the
//! tree is assembled like a postfix expression: leaves are pushed, AND/OR
//! pop two nodes, NOT pops one, and `finalize` expects exactly one node left.

use crate::errors::{SqlError, SqlResult};

use super::eval::compare_constants;
use super::node::{Comparison, SargNode, SargOp};

/// Builds a predicate tree from parser-ordered calls
#[derive(Debug, Clone, Default)]
pub struct SargBuilder {
    stack: Vec<SargNode>,
    predicate: Option<SargNode>,
}

impl SargBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a `column <op> constant` leaf.
    pub fn add_comparison(&mut self, column: &str, op: &str, constant: &str) -> SqlResult<()> {
        let op = SargOp::from_token(op)?;
        self.push_comparison(column, op, constant)
    }

    /// Pushes an `IS NULL` or `IS NOT NULL` leaf
    pub fn add_null_check(&mut self, column: &str, is_null: bool) -> SqlResult<()> {
        let op = if is_null {
            SargOp::IsNull
        } else {
            SargOp::IsNotNull
        };
        self.push_comparison(column, op, "")
    }

    fn push_comparison(&mut self, column: &str, op: SargOp, constant: &str) -> SqlResult<()> {
        if column.is_empty() {
            return Err(SqlError::invalid_name("Column"));
        }
        let cmp = Comparison::new(column, op, constant)?;
        self.stack.push(SargNode::Comparison(cmp));
        Ok(())
    }

    /// Folds a literal-only comparison (`1 = 1`) and pushes the result
    pub fn add_constant_comparison(&mut self, lhs: &str, op: &str, rhs: &str) -> SqlResult<()> {
        let op = SargOp::from_token(op)?;
        let result = compare_constants(lhs, op, rhs)?;
        self.stack.push(SargNode::Constant(result));
        Ok(())
    }

    /// Joins the two most recent operands with AND
    pub fn add_and(&mut self) -> SqlResult<()> {
        let (left, right) = self.pop_pair("AND")?;
        self.stack.push(SargNode::and(left, right));
        Ok(())
    }

    /// Joins the two most recent operands with OR
    pub fn add_or(&mut self) -> SqlResult<()> {
        let (left, right) = self.pop_pair("OR")?;
        self.stack.push(SargNode::or(left, right));
        Ok(())
    }

    /// Negates the most recent operand
    pub fn add_not(&mut self) -> SqlResult<()> {
        let child = self.stack.pop().ok_or_else(|| {
            SqlError::malformed_predicate("NOT requires one operand, found none")
        })?;
        self.stack.push(SargNode::not(child));
        Ok(())
    }

    fn pop_pair(&mut self, combinator: &str) -> SqlResult<(SargNode, SargNode)> {
        if self.stack.len() < 2 {
            return Err(SqlError::malformed_predicate(format!(
                "{} requires two operands, found {}",
                combinator,
                self.stack.len()
            )));
        }
        // Checked above: both pops succeed
        match (self.stack.pop(), self.stack.pop()) {
            (Some(right), Some(left)) => Ok((left, right)),
            _ => Err(SqlError::malformed_predicate("operand stack underflow")),
        }
    }

    /// Installs the single remaining operand as the predicate.
    pub fn finalize(&mut self) -> SqlResult<()> {
        if self.stack.len() != 1 {
            return Err(SqlError::malformed_predicate(format!(
                "expected exactly one operand at finalize, found {}",
                self.stack.len()
            )));
        }
        self.predicate = self.stack.pop();
        Ok(())
    }

    /// Number of operands not yet reduced into the predicate
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    pub fn predicate(&self) -> Option<&SargNode> {
        self.predicate.as_ref()
    }

    /// Drops the predicate and any pending operands
    pub fn clear(&mut self) {
        self.stack.clear();
        self.predicate = None;
    }
}
