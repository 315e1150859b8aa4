//! Search-argument tree nodes

use std::cmp::Ordering;

use regex::Regex;

use crate::errors::{SqlError, SqlResult};

/// Comparison operators accepted in a search argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SargOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `%` matches any run, `_` any single character
    Like,
    /// Case-insensitive LIKE
    ILike,
    IsNull,
    IsNotNull,
}

impl SargOp {
    /// Parses an operator token as emitted by the query parser
    pub fn from_token(token: &str) -> SqlResult<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "=" | "==" => Ok(SargOp::Eq),
            "<>" | "!=" => Ok(SargOp::Ne),
            "<" => Ok(SargOp::Lt),
            "<=" | "=<" => Ok(SargOp::Le),
            ">" => Ok(SargOp::Gt),
            ">=" | "=>" => Ok(SargOp::Ge),
            "like" => Ok(SargOp::Like),
            "ilike" => Ok(SargOp::ILike),
            "is null" | "isnull" => Ok(SargOp::IsNull),
            "is not null" | "notnull" => Ok(SargOp::IsNotNull),
            _ => Err(SqlError::invalid_operator(token)),
        }
    }

    /// Returns the SQL spelling for dumps
    pub fn symbol(&self) -> &'static str {
        match self {
            SargOp::Eq => "=",
            SargOp::Ne => "<>",
            SargOp::Lt => "<",
            SargOp::Le => "<=",
            SargOp::Gt => ">",
            SargOp::Ge => ">=",
            SargOp::Like => "LIKE",
            SargOp::ILike => "ILIKE",
            SargOp::IsNull => "IS NULL",
            SargOp::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns true for operators that take no constant
    pub fn is_null_check(&self) -> bool {
        matches!(self, SargOp::IsNull | SargOp::IsNotNull)
    }

    /// Returns true for pattern-matching operators
    pub fn is_pattern(&self) -> bool {
        matches!(self, SargOp::Like | SargOp::ILike)
    }

    /// Returns whether an ordering between the row value and the constant
    /// satisfies a relational operator
    pub fn accepts(&self, ord: Ordering) -> bool {
        match self {
            SargOp::Eq => ord == Ordering::Equal,
            SargOp::Ne => ord != Ordering::Equal,
            SargOp::Lt => ord == Ordering::Less,
            SargOp::Le => ord != Ordering::Greater,
            SargOp::Gt => ord == Ordering::Greater,
            SargOp::Ge => ord != Ordering::Less,
            SargOp::Like | SargOp::ILike | SargOp::IsNull | SargOp::IsNotNull => false,
        }
    }
}

/// Leaf comparison of a column against a textual constant.
///
/// The constant is coerced to the column's type at evaluation time.
#[derive(Debug, Clone)]
pub struct Comparison {
    column: String,
    op: SargOp,
    constant: String,
    pattern: Option<Regex>,
}

impl Comparison {
    pub fn new(column: impl Into<String>, op: SargOp, constant: impl Into<String>) -> SqlResult<Self> {
        let constant = constant.into();
        let pattern = match op {
            SargOp::Like => Some(like_regex(&constant, false)?),
            SargOp::ILike => Some(like_regex(&constant, true)?),
            _ => None,
        };
        Ok(Self {
            column: column.into(),
            op,
            constant,
            pattern,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> SargOp {
        self.op
    }

    pub fn constant(&self) -> &str {
        &self.constant
    }

    pub(crate) fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }
}

/// Compiles a LIKE pattern into an anchored regex.
pub fn like_regex(pattern: &str, case_insensitive: bool) -> SqlResult<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        re.push_str("(?i)");
    }
    re.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|_| SqlError::invalid_conversion(pattern, "LIKE pattern"))
}

/// A node of the search-argument tree
#[derive(Debug, Clone)]
pub enum SargNode {
    Comparison(Comparison),
    /// Literal-only comparison folded at build time
    Constant(bool),
    And {
        left: Box<SargNode>,
        right: Box<SargNode>,
    },
    Or {
        left: Box<SargNode>,
        right: Box<SargNode>,
    },
    Not {
        child: Box<SargNode>,
    },
}

impl SargNode {
    pub fn and(left: SargNode, right: SargNode) -> Self {
        SargNode::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: SargNode, right: SargNode) -> Self {
        SargNode::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(child: SargNode) -> Self {
        SargNode::Not {
            child: Box::new(child),
        }
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        match self {
            SargNode::Comparison(_) | SargNode::Constant(_) => 1,
            SargNode::And { left, right } | SargNode::Or { left, right } => {
                1 + left.node_count() + right.node_count()
            }
            SargNode::Not { child } => 1 + child.node_count(),
        }
    }
}
