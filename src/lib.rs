//! # taut-rs: Tautology checking for propositional formulas
//!
//! **`taut-rs`** decides whether a propositional formula is a **tautology** (true under every
//! assignment of its variables) by brute-force enumeration of the truth table.
//!
//! Formulas use single-letter variables and four connectives, from tightest to loosest binding:
//!
//! | Symbol | Meaning     |
//! |--------|-------------|
//! | `¬`    | negation    |
//! | `∧`    | conjunction |
//! | `∨`    | disjunction |
//! | `→`    | implication |
//!
//! Binary connectives associate to the left, so `a → b → c` means `(a → b) → c`.
//!
//! ## Design
//!
//! - **Shared immutable trees**: a [`Formula`][crate::ast::Formula] is a cheap handle to a
//!   reference-counted node. Subtrees can be shared freely and are never mutated.
//! - **No recursion on the native stack**: evaluation, printing and dropping all use explicit
//!   heap-allocated stacks, so formulas nested hundreds of thousands of levels deep are fine.
//! - **Bounded checks**: [`Evaluator::is_tautology_with_timeout`][crate::eval::Evaluator::is_tautology_with_timeout]
//!   gives up with a timeout error instead of running for `2^n` rows.
//!
//! ## Basic Usage
//!
//! ```rust
//! use taut_rs::eval::Evaluator;
//! use taut_rs::parser::parse;
//!
//! // 1. Parse a formula
//! let f = parse("(p → q) ∧ p → q").unwrap();
//!
//! // 2. Collect its variables (in order of first occurrence)
//! let vars = f.collect_variables();
//! assert_eq!(vars, vec!['p', 'q']);
//!
//! // 3. Check it over all 2^2 rows
//! let mut evaluator = Evaluator::new();
//! assert!(evaluator.is_tautology(&f, &vars).unwrap());
//! assert_eq!(evaluator.metrics().evaluations, 4);
//! ```
//!
//! ## Core Components
//!
//! - **[`parser`]**: formula text to [`Formula`][crate::ast::Formula].
//! - **[`eval`]**: the [`Evaluator`][crate::eval::Evaluator] and the exhaustive checks.
//! - **[`truth_table`]**: truth-table rows, lazily.
//! - **[`generator`]** and **[`instance`]**: random benchmark instances and their file format.

pub mod ast;
pub mod cancel;
pub mod config;
pub mod debug;
pub mod eval;
pub mod generator;
pub mod instance;
pub mod parser;
pub mod truth_table;
