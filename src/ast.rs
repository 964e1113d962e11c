//! Propositional formula trees.
//!
//! A [`Formula`] is a cheap, clonable handle to an immutable node. Subtrees are
//! reference-counted, so the same subformula can be shared between several
//! parents (and between several formulas) without copying:
//!
//! ```
//! use taut_rs::ast::Formula;
//!
//! let a = Formula::var('a');
//! let na = Formula::not(a.clone());
//! // `a ∨ ¬a`, where `a` is shared by both branches
//! let f = Formula::or(a.clone(), na);
//! assert_eq!(f.to_string(), "(a ∨ ¬a)");
//! assert_eq!(f.collect_variables(), vec!['a']);
//! ```
//!
//! Every traversal in this module uses an explicit stack, including `Drop`,
//! so arbitrarily deep formulas (e.g. long chains of `¬`) never exhaust the
//! native call stack.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::str::FromStr;

use crate::parser::{parse, SyntaxError};

/// The kind of connective at the root of a formula.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Var,
    Not,
    And,
    Or,
    Implies,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Var => "VAR",
            NodeKind::Not => "NOT",
            NodeKind::And => "AND",
            NodeKind::Or => "OR",
            NodeKind::Implies => "IMPLIES",
        };
        f.write_str(name)
    }
}

/// A single formula node.
///
/// The shape of the enum guarantees the arity invariants: variables are
/// leaves, negation has exactly one child, the binary connectives exactly two.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Node {
    Var(char),
    Not(Formula),
    And(Formula, Formula),
    Or(Formula, Formula),
    Implies(Formula, Formula),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Var(_) => NodeKind::Var,
            Node::Not(_) => NodeKind::Not,
            Node::And(..) => NodeKind::And,
            Node::Or(..) => NodeKind::Or,
            Node::Implies(..) => NodeKind::Implies,
        }
    }

    /// Moves the children out into `out`, leaving detached leaves behind.
    fn detach_children(&mut self, out: &mut Vec<Rc<Node>>) {
        match self {
            Node::Var(_) => {}
            Node::Not(a) => out.push(a.detach()),
            Node::And(a, b) | Node::Or(a, b) | Node::Implies(a, b) => {
                out.push(a.detach());
                out.push(b.detach());
            }
        }
    }
}

thread_local! {
    static DETACHED: Cell<Option<Rc<Node>>> = const { Cell::new(None) };
}

/// Shared placeholder left in a handle whose node was moved out during drop.
fn detached_leaf() -> Rc<Node> {
    DETACHED
        .try_with(|cell| {
            let leaf = cell
                .take()
                .unwrap_or_else(|| Rc::new(Node::Var('\0')));
            cell.set(Some(Rc::clone(&leaf)));
            leaf
        })
        .unwrap_or_else(|_| Rc::new(Node::Var('\0')))
}

/// Reference-counted handle to an immutable formula tree.
///
/// Equality and hashing are structural.
#[derive(Clone)]
pub struct Formula(Rc<Node>);

// Constructors
impl Formula {
    pub fn new(node: Node) -> Self {
        Formula(Rc::new(node))
    }

    pub fn var(name: char) -> Self {
        Formula::new(Node::Var(name))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Formula) -> Self {
        Formula::new(Node::Not(operand))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Formula::new(Node::And(left, right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Formula::new(Node::Or(left, right))
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Formula::new(Node::Implies(left, right))
    }
}

// Getters
impl Formula {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind()
    }

    /// The variable name, if this is a leaf.
    pub fn name(&self) -> Option<char> {
        match self.node() {
            Node::Var(name) => Some(*name),
            _ => None,
        }
    }

    /// The only child of `¬`, or the left child of a binary connective.
    pub fn left(&self) -> Option<&Formula> {
        match self.node() {
            Node::Var(_) => None,
            Node::Not(a) => Some(a),
            Node::And(a, _) | Node::Or(a, _) | Node::Implies(a, _) => Some(a),
        }
    }

    pub fn right(&self) -> Option<&Formula> {
        match self.node() {
            Node::Var(_) | Node::Not(_) => None,
            Node::And(_, b) | Node::Or(_, b) | Node::Implies(_, b) => Some(b),
        }
    }

    /// Returns `true` if both handles point at the very same node.
    pub fn ptr_eq(&self, other: &Formula) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Checks
impl Formula {
    pub fn is_leaf(&self) -> bool {
        matches!(self.node(), Node::Var(_))
    }

    pub fn is_unary(&self) -> bool {
        matches!(self.node(), Node::Not(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self.node(),
            Node::And(..) | Node::Or(..) | Node::Implies(..)
        )
    }
}

// Traversals
impl Formula {
    /// Distinct variable names in first-discovery order.
    ///
    /// The tree is walked in pre-order, left subtree before right subtree, so
    /// `(b ∧ a)` yields `['b', 'a']`.
    pub fn collect_variables(&self) -> Vec<char> {
        let mut variables = Vec::new();
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            match formula.node() {
                Node::Var(name) => {
                    if !variables.contains(name) {
                        variables.push(*name);
                    }
                }
                Node::Not(a) => stack.push(a),
                Node::And(a, b) | Node::Or(a, b) | Node::Implies(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        variables
    }

    /// Number of nodes, counting shared subtrees once per occurrence.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            count += 1;
            stack.extend(formula.left());
            stack.extend(formula.right());
        }
        count
    }

    /// Length of the longest root-to-leaf path, a single leaf having depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1)];
        while let Some((formula, depth)) = stack.pop() {
            max = max.max(depth);
            if let Some(a) = formula.left() {
                stack.push((a, depth + 1));
            }
            if let Some(b) = formula.right() {
                stack.push((b, depth + 1));
            }
        }
        max
    }

    /// Takes the node out of this handle, leaving a detached leaf behind.
    fn detach(&mut self) -> Rc<Node> {
        std::mem::replace(&mut self.0, detached_leaf())
    }
}

impl Drop for Formula {
    fn drop(&mut self) {
        if Rc::strong_count(&self.0) > 1 || self.is_leaf() {
            return;
        }
        let mut pending = vec![self.detach()];
        while let Some(rc) = pending.pop() {
            // Shared nodes stay alive, only sole owners are taken apart.
            if let Ok(mut node) = Rc::try_unwrap(rc) {
                node.detach_children(&mut pending);
            }
        }
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((x, y)) = stack.pop() {
            if x.ptr_eq(y) {
                continue;
            }
            match (x.node(), y.node()) {
                (Node::Var(p), Node::Var(q)) => {
                    if p != q {
                        return false;
                    }
                }
                (Node::Not(a), Node::Not(b)) => stack.push((a, b)),
                (Node::And(a1, b1), Node::And(a2, b2))
                | (Node::Or(a1, b1), Node::Or(a2, b2))
                | (Node::Implies(a1, b1), Node::Implies(a2, b2)) => {
                    stack.push((b1, b2));
                    stack.push((a1, a2));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    /// Pre-order sequence of node kinds and variable names.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut stack = vec![self];
        while let Some(formula) = stack.pop() {
            formula.kind().hash(state);
            if let Node::Var(name) = formula.node() {
                name.hash(state);
            }
            stack.extend(formula.right());
            stack.extend(formula.left());
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formula({})", self)
    }
}

/// Piece of output still to be written by the iterative printer.
enum Piece<'a> {
    Formula(&'a Formula),
    Text(&'static str),
}

impl fmt::Display for Formula {
    /// Fully parenthesized infix form, e.g. `((a → b) → ¬c)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Formula(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Formula(formula) => match formula.node() {
                    Node::Var(name) => write!(f, "{}", name)?,
                    Node::Not(a) => {
                        f.write_str("¬")?;
                        stack.push(Piece::Formula(a));
                    }
                    Node::And(a, b) | Node::Or(a, b) | Node::Implies(a, b) => {
                        let op = match formula.kind() {
                            NodeKind::And => " ∧ ",
                            NodeKind::Or => " ∨ ",
                            _ => " → ",
                        };
                        f.write_str("(")?;
                        stack.push(Piece::Text(")"));
                        stack.push(Piece::Formula(b));
                        stack.push(Piece::Text(op));
                        stack.push(Piece::Formula(a));
                    }
                },
            }
        }
        Ok(())
    }
}

impl FromStr for Formula {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
