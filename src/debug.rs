//! Debug utilities for inspecting formula structure.
//!
//! These are diagnostic only: nothing in the decision procedures looks at the
//! dump. The layout mirrors the node shape, two spaces of indentation per
//! level:
//!
//! ```text
//! IMPLIES
//!   VAR: a
//!   NOT
//!     VAR: b
//! ```

use std::fmt;

use crate::ast::{Formula, Node};

/// A tree rendering of a formula, starting at some indentation depth.
#[derive(Debug, Clone, Copy)]
pub struct FormulaTree<'a> {
    pub root: &'a Formula,
    pub depth: usize,
}

impl fmt::Display for FormulaTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, self.depth)];
        while let Some((formula, depth)) = stack.pop() {
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            match formula.node() {
                Node::Var(name) => writeln!(f, "VAR: {}", name)?,
                _ => writeln!(f, "{}", formula.kind())?,
            }
            if let Some(b) = formula.right() {
                stack.push((b, depth + 1));
            }
            if let Some(a) = formula.left() {
                stack.push((a, depth + 1));
            }
        }
        Ok(())
    }
}

impl Formula {
    /// Tree rendering with the root indented by `depth` levels.
    pub fn tree(&self, depth: usize) -> FormulaTree<'_> {
        FormulaTree { root: self, depth }
    }

    /// Renders the tree dump into a string.
    pub fn dump(&self, depth: usize) -> String {
        self.tree(depth).to_string()
    }

    /// Prints the tree dump to stdout.
    pub fn print(&self, depth: usize) {
        print!("{}", self.tree(depth));
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    #[test]
    fn test_dump_leaf() {
        let f = parse("p").unwrap();
        assert_eq!(f.dump(0), "VAR: p\n");
        assert_eq!(f.dump(2), "    VAR: p\n");
    }

    #[test]
    fn test_dump_nested() {
        let f = parse("a → ¬b ∨ c").unwrap();
        let expected = "\
IMPLIES
  VAR: a
  OR
    NOT
      VAR: b
    VAR: c
";
        assert_eq!(f.dump(0), expected);
    }

    #[test]
    fn test_dump_children_order() {
        let f = parse("(q ∧ p)").unwrap();
        assert_eq!(f.dump(1), "  AND\n    VAR: q\n    VAR: p\n");
    }
}
