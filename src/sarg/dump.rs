//! Human-readable trace of a predicate tree

use std::fmt::Write;

use super::node::SargNode;

impl SargNode {
    /// Appends this subtree to `out`, indented two spaces per level.
    pub fn dump_node(&self, level: usize, out: &mut String) {
        let indent = "  ".repeat(level);
        let _ = match self {
            SargNode::Comparison(cmp) if cmp.op().is_null_check() => {
                writeln!(out, "{}{} {}", indent, cmp.column(), cmp.op().symbol())
            }
            SargNode::Comparison(cmp) => writeln!(
                out,
                "{}{} {} '{}'",
                indent,
                cmp.column(),
                cmp.op().symbol(),
                cmp.constant()
            ),
            SargNode::Constant(b) => writeln!(out, "{}{}", indent, if *b { "TRUE" } else { "FALSE" }),
            SargNode::And { .. } => writeln!(out, "{}AND", indent),
            SargNode::Or { .. } => writeln!(out, "{}OR", indent),
            SargNode::Not { .. } => writeln!(out, "{}NOT", indent),
        };

        match self {
            SargNode::And { left, right } | SargNode::Or { left, right } => {
                left.dump_node(level + 1, out);
                right.dump_node(level + 1, out);
            }
            SargNode::Not { child } => child.dump_node(level + 1, out),
            SargNode::Comparison(_) | SargNode::Constant(_) => {}
        }
    }

    /// Renders the whole subtree
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::sarg::SargBuilder;

    #[test]
    fn test_dump_indents_children() {
        let mut b = SargBuilder::new();
        b.add_comparison("id", ">", "1").unwrap();
        b.add_comparison("name", "=", "c").unwrap();
        b.add_not().unwrap();
        b.add_and().unwrap();
        b.add_null_check("note", true).unwrap();
        b.add_or().unwrap();
        b.finalize().unwrap();

        let dump = b.predicate().unwrap().dump();
        assert_eq!(
            dump,
            "OR\n  AND\n    id > '1'\n    NOT\n      name = 'c'\n  note IS NULL\n"
        );
    }
}
