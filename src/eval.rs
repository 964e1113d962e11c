//! Formula evaluation and exhaustive checks.
//!
//! [`Evaluator::evaluate`] computes the value of a formula under one
//! [`Assignment`] without recursion: it keeps a work stack of frames, each
//! either waiting to push its children (`Expand`) or ready to combine their
//! values (`Combine`), and a second stack of intermediate values. Stack memory
//! is therefore heap-allocated and proportional to the formula depth, however
//! deep the formula is.
//!
//! The exhaustive checks walk the whole [`TruthTable`] and stop as soon as the
//! answer is known:
//!
//! ```
//! use taut_rs::eval::{Evaluator, Verdict};
//! use taut_rs::parser::parse;
//!
//! let f = parse("¬(a ∧ ¬a)").unwrap();
//! let vars = f.collect_variables();
//!
//! let mut evaluator = Evaluator::new();
//! assert!(evaluator.is_tautology(&f, &vars).unwrap());
//! assert_eq!(evaluator.metrics().evaluations, 2);
//!
//! let g = parse("a ∨ b").unwrap();
//! let verdict = evaluator.classify(&g, &g.collect_variables()).unwrap();
//! assert_eq!(verdict, Verdict::Contingent);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use num_bigint::BigUint;
use thiserror::Error;

use crate::ast::{Formula, Node};
use crate::cancel::{CancelToken, Watchdog};
use crate::config::TimeBudget;
use crate::truth_table::TruthTable;

/// The cancellation token is polled once per this many stack steps.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Why a bounded check gave up.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimeoutCause {
    /// The elapsed time exceeded the budget between two rows.
    Budget,
    /// The watchdog (or an external caller) cancelled the check mid-row.
    Deadline,
}

impl fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutCause::Budget => f.write_str("time budget exceeded"),
            TimeoutCause::Deadline => f.write_str("deadline expired"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum EvalError {
    #[error("variable '{0}' is not bound by the assignment")]
    UnboundVariable(char),

    #[error("timeout after {elapsed:?}: {cause}")]
    Timeout {
        elapsed: Duration,
        cause: TimeoutCause,
    },
}

impl EvalError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, EvalError::Timeout { .. })
    }
}

/// Values of the variables for one truth-table row.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Assignment(HashMap<char, bool>);

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variables[i]` to `row[i]`.
    pub fn from_row(variables: &[char], row: &[bool]) -> Self {
        assert_eq!(
            variables.len(),
            row.len(),
            "Row width must match the number of variables"
        );
        variables.iter().copied().zip(row.iter().copied()).collect()
    }

    pub fn get(&self, name: char) -> Option<bool> {
        self.0.get(&name).copied()
    }

    pub fn set(&mut self, name: char, value: bool) {
        self.0.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(char, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (char, bool)>>(iter: I) -> Self {
        Assignment(iter.into_iter().collect())
    }
}

/// Counters for one evaluation session.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Metrics {
    /// Calls to `evaluate`, i.e. truth-table rows evaluated.
    pub evaluations: u64,
    /// Variable leaves looked up in an assignment.
    pub variable_lookups: u64,
    /// Steps of the work stack.
    pub stack_operations: u64,
    /// High-water mark of the work stack.
    pub max_stack_size: usize,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evaluations={}, variable_lookups={}, stack_operations={}, max_stack_size={}",
            self.evaluations, self.variable_lookups, self.stack_operations, self.max_stack_size
        )
    }
}

/// Outcome of a full classification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Verdict {
    /// True under every assignment.
    Tautology,
    /// False under every assignment.
    Contradiction,
    /// Neither.
    Contingent,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Tautology => f.write_str("tautology"),
            Verdict::Contradiction => f.write_str("contradiction"),
            Verdict::Contingent => f.write_str("contingent"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Expand,
    Combine,
}

#[derive(Debug)]
struct Frame<'a> {
    node: &'a Formula,
    phase: Phase,
}

impl<'a> Frame<'a> {
    fn new(node: &'a Formula) -> Self {
        Self {
            node,
            phase: Phase::Expand,
        }
    }

    fn combine(node: &'a Formula) -> Self {
        Self {
            node,
            phase: Phase::Combine,
        }
    }
}

/// Time and cancellation limits of a running check.
struct Limits<'a> {
    start: Instant,
    budget: Option<Duration>,
    token: Option<&'a CancelToken>,
}

impl Limits<'_> {
    fn unbounded() -> Self {
        Self {
            start: Instant::now(),
            budget: None,
            token: None,
        }
    }

    /// Polled before every row.
    fn check_row(&self) -> Result<(), EvalError> {
        let elapsed = self.start.elapsed();
        if let Some(budget) = self.budget {
            if elapsed > budget {
                warn!("time budget of {:?} exceeded after {:?}", budget, elapsed);
                return Err(EvalError::Timeout {
                    elapsed,
                    cause: TimeoutCause::Budget,
                });
            }
        }
        self.check_cancelled()
    }

    fn check_cancelled(&self) -> Result<(), EvalError> {
        match self.token {
            Some(token) if token.is_cancelled() => Err(EvalError::Timeout {
                elapsed: self.start.elapsed(),
                cause: TimeoutCause::Deadline,
            }),
            _ => Ok(()),
        }
    }
}

/// Evaluates formulas and runs truth-table sweeps, collecting [`Metrics`].
#[derive(Debug, Default)]
pub struct Evaluator {
    metrics: Metrics,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics = Metrics::default();
    }

    /// Value of `root` under `assignment`.
    ///
    /// Fails with [`EvalError::UnboundVariable`] when a variable of the formula
    /// has no value in `assignment`.
    pub fn evaluate(&mut self, root: &Formula, assignment: &Assignment) -> Result<bool, EvalError> {
        self.evaluate_with(root, assignment, None)
    }

    fn evaluate_with(
        &mut self,
        root: &Formula,
        assignment: &Assignment,
        limits: Option<&Limits>,
    ) -> Result<bool, EvalError> {
        self.metrics.evaluations += 1;

        let mut work: Vec<Frame> = vec![Frame::new(root)];
        let mut values: Vec<bool> = Vec::new();
        self.metrics.max_stack_size = self.metrics.max_stack_size.max(work.len());

        let mut steps: u64 = 0;
        while let Some(Frame { node, phase }) = work.pop() {
            self.metrics.stack_operations += 1;
            steps += 1;
            if steps % CANCEL_POLL_INTERVAL == 0 {
                if let Some(limits) = limits {
                    limits.check_cancelled()?;
                }
            }

            match (node.node(), phase) {
                (Node::Var(name), _) => {
                    self.metrics.variable_lookups += 1;
                    let value = assignment
                        .get(*name)
                        .ok_or(EvalError::UnboundVariable(*name))?;
                    values.push(value);
                }
                (Node::Not(a), Phase::Expand) => {
                    work.push(Frame::combine(node));
                    work.push(Frame::new(a));
                    self.metrics.max_stack_size = self.metrics.max_stack_size.max(work.len());
                }
                (Node::And(a, b) | Node::Or(a, b) | Node::Implies(a, b), Phase::Expand) => {
                    work.push(Frame::combine(node));
                    // Right first, so that the left child is walked first.
                    work.push(Frame::new(b));
                    work.push(Frame::new(a));
                    self.metrics.max_stack_size = self.metrics.max_stack_size.max(work.len());
                }
                (Node::Not(_), Phase::Combine) => {
                    let value = pop_value(&mut values);
                    values.push(!value);
                }
                (Node::And(..) | Node::Or(..) | Node::Implies(..), Phase::Combine) => {
                    let right = pop_value(&mut values);
                    let left = pop_value(&mut values);
                    values.push(match node.node() {
                        Node::And(..) => left && right,
                        Node::Or(..) => left || right,
                        _ => !left || right,
                    });
                }
            }
        }

        assert_eq!(
            values.len(),
            1,
            "Evaluation must leave exactly one value on the value stack"
        );
        Ok(values[0])
    }

    /// Returns `true` iff `root` is true under every assignment of `variables`.
    ///
    /// Rows are visited in truth-table order; the sweep stops at the first
    /// falsifying row.
    pub fn is_tautology(&mut self, root: &Formula, variables: &[char]) -> Result<bool, EvalError> {
        debug!("is_tautology({}, vars = {:?})", root, variables);
        self.reset_metrics();
        self.sweep_until(root, variables, false, &Limits::unbounded())
            .map(|found| !found)
    }

    /// Returns `true` iff `root` is false under every assignment of `variables`.
    pub fn is_contradiction(
        &mut self,
        root: &Formula,
        variables: &[char],
    ) -> Result<bool, EvalError> {
        debug!("is_contradiction({}, vars = {:?})", root, variables);
        self.reset_metrics();
        self.sweep_until(root, variables, true, &Limits::unbounded())
            .map(|found| !found)
    }

    /// [`is_tautology`](Self::is_tautology) under a two-tier time limit.
    ///
    /// The elapsed time is checked against `limit.budget` before each row, and
    /// a watchdog cancels the sweep mid-row once `limit.deadline_secs` have
    /// passed. Either way the result is [`EvalError::Timeout`], never a
    /// verdict.
    pub fn is_tautology_with_timeout(
        &mut self,
        root: &Formula,
        variables: &[char],
        limit: &TimeBudget,
    ) -> Result<bool, EvalError> {
        debug!(
            "is_tautology_with_timeout({}, vars = {:?}, limit = {:?})",
            root, variables, limit
        );
        self.reset_metrics();
        let token = CancelToken::new();
        let watchdog = Watchdog::arm(limit.deadline(), token.clone());
        let limits = Limits {
            start: Instant::now(),
            budget: Some(limit.budget),
            token: Some(&token),
        };
        let result = self.sweep_until(root, variables, false, &limits);
        watchdog.disarm();
        result.map(|found| !found)
    }

    /// [`is_tautology`](Self::is_tautology), abandoned with
    /// [`EvalError::Timeout`] once `token` is cancelled.
    pub fn is_tautology_cancellable(
        &mut self,
        root: &Formula,
        variables: &[char],
        token: &CancelToken,
    ) -> Result<bool, EvalError> {
        debug!("is_tautology_cancellable({}, vars = {:?})", root, variables);
        self.reset_metrics();
        let limits = Limits {
            start: Instant::now(),
            budget: None,
            token: Some(token),
        };
        self.sweep_until(root, variables, false, &limits)
            .map(|found| !found)
    }

    /// Tautology, contradiction or neither, in a single sweep.
    pub fn classify(&mut self, root: &Formula, variables: &[char]) -> Result<Verdict, EvalError> {
        debug!("classify({}, vars = {:?})", root, variables);
        self.reset_metrics();
        self.classify_sweep(root, variables, &Limits::unbounded())
    }

    /// [`classify`](Self::classify) under the same two-tier limit as
    /// [`is_tautology_with_timeout`](Self::is_tautology_with_timeout).
    pub fn classify_with_timeout(
        &mut self,
        root: &Formula,
        variables: &[char],
        limit: &TimeBudget,
    ) -> Result<Verdict, EvalError> {
        debug!(
            "classify_with_timeout({}, vars = {:?}, limit = {:?})",
            root, variables, limit
        );
        self.reset_metrics();
        let token = CancelToken::new();
        let watchdog = Watchdog::arm(limit.deadline(), token.clone());
        let limits = Limits {
            start: Instant::now(),
            budget: Some(limit.budget),
            token: Some(&token),
        };
        let result = self.classify_sweep(root, variables, &limits);
        watchdog.disarm();
        result
    }

    /// Number of assignments of `variables` under which `root` is true.
    pub fn count_models(&mut self, root: &Formula, variables: &[char]) -> Result<BigUint, EvalError> {
        debug!("count_models({}, vars = {:?})", root, variables);
        self.reset_metrics();
        let mut count = BigUint::default();
        for row in TruthTable::new(variables.len()) {
            let assignment = Assignment::from_row(variables, &row);
            if self.evaluate(root, &assignment)? {
                count += 1u32;
            }
        }
        Ok(count)
    }

    /// Walks the truth table until a row evaluates to `target`.
    ///
    /// Returns whether such a row was found.
    fn sweep_until(
        &mut self,
        root: &Formula,
        variables: &[char],
        target: bool,
        limits: &Limits,
    ) -> Result<bool, EvalError> {
        for row in TruthTable::new(variables.len()) {
            limits.check_row()?;
            let assignment = Assignment::from_row(variables, &row);
            let value = self.evaluate_with(root, &assignment, Some(limits))?;
            if value == target {
                trace!("row {:?} evaluates to {}, stopping", row, value);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn classify_sweep(
        &mut self,
        root: &Formula,
        variables: &[char],
        limits: &Limits,
    ) -> Result<Verdict, EvalError> {
        let mut seen_true = false;
        let mut seen_false = false;
        for row in TruthTable::new(variables.len()) {
            limits.check_row()?;
            let assignment = Assignment::from_row(variables, &row);
            if self.evaluate_with(root, &assignment, Some(limits))? {
                seen_true = true;
            } else {
                seen_false = true;
            }
            if seen_true && seen_false {
                trace!("row {:?} settles the verdict", row);
                return Ok(Verdict::Contingent);
            }
        }
        Ok(if seen_true {
            Verdict::Tautology
        } else {
            Verdict::Contradiction
        })
    }
}

fn pop_value(values: &mut Vec<bool>) -> bool {
    values
        .pop()
        .expect("Operand value must be on the value stack")
}
