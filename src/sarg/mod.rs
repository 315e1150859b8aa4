//! Search-argument (SARG) predicate trees
//!
//! A predicate is a tree of column comparisons joined by AND, OR and NOT.
//! It is built bottom-up through [`SargBuilder`] in the order a parser
//! emits tokens, then evaluated once per scanned row.
//!
//! # Invariants
//!
//! - Combinators validate operand counts at construction time
//! - Column references are checked at evaluation time only
//! - An absent predicate matches every row
//! - Floating equality is exact; callers needing tolerance must round first

mod builder;
mod dump;
mod eval;
mod node;

pub use builder::SargBuilder;
pub use eval::{compare_constants, compare_floats};
pub use node::{like_regex, Comparison, SargNode, SargOp};
