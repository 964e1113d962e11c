//! Random formula synthesis.
//!
//! [`FormulaGenerator`] produces three families of formulas over the variables
//! `a`, `b`, `c`, ...:
//!
//! - random trees, padded so that every variable of the chosen range occurs,
//! - tautologies built from a known valid base,
//! - contradictions built from `(a ∧ ¬a)`.
//!
//! The generator is seeded, so the same configuration and seed always yield
//! the same formulas.
//!
//! ```
//! use taut_rs::eval::Evaluator;
//! use taut_rs::generator::{FormulaGenerator, GeneratorConfig};
//!
//! let config = GeneratorConfig::new(2, 4, 5).unwrap();
//! let mut generator = FormulaGenerator::new(config, 42);
//!
//! let f = generator.tautology();
//! let vars = f.collect_variables();
//! assert!(Evaluator::new().is_tautology(&f, &vars).unwrap());
//! ```

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::ast::Formula;
use crate::instance::{Instance, InstanceKind};

/// Variables are the lowercase letters, so at most 26 of them.
pub const MAX_VARS: usize = 26;

/// Probability of stopping at a leaf before the depth limit.
const LEAF_PROBABILITY: f64 = 0.3;

const TAUTOLOGY_SHARE: f64 = 0.7;
const CONTRADICTION_SHARE: f64 = 0.2;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum GeneratorError {
    #[error("at least one variable is required")]
    NoVariables,

    #[error("at most 26 variables are supported (a-z), got {0}")]
    TooManyVariables(usize),

    #[error("minimum number of variables ({min}) exceeds the maximum ({max})")]
    InvertedRange { min: usize, max: usize },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GeneratorConfig {
    min_vars: usize,
    max_vars: usize,
    max_depth: usize,
}

impl GeneratorConfig {
    /// Checks `1 <= min_vars <= max_vars <= 26`.
    pub fn new(min_vars: usize, max_vars: usize, max_depth: usize) -> Result<Self, GeneratorError> {
        if max_vars > MAX_VARS {
            return Err(GeneratorError::TooManyVariables(max_vars));
        }
        if min_vars > max_vars {
            return Err(GeneratorError::InvertedRange {
                min: min_vars,
                max: max_vars,
            });
        }
        if min_vars == 0 {
            return Err(GeneratorError::NoVariables);
        }
        Ok(Self {
            min_vars,
            max_vars,
            max_depth,
        })
    }

    pub fn min_vars(&self) -> usize {
        self.min_vars
    }

    pub fn max_vars(&self) -> usize {
        self.max_vars
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

fn variable(index: usize) -> Formula {
    debug_assert!(index < MAX_VARS);
    Formula::var((b'a' + index as u8) as char)
}

/// `(v ∨ ¬v)`, true under every assignment.
fn excluded_middle(index: usize) -> Formula {
    Formula::or(variable(index), Formula::not(variable(index)))
}

#[derive(Debug)]
pub struct FormulaGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl FormulaGenerator {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        debug!("FormulaGenerator::new({:?}, seed = {})", config, seed);
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn target_vars(&mut self) -> usize {
        self.rng
            .random_range(self.config.min_vars..=self.config.max_vars)
    }

    /// Random tree over the first `target_vars` variables.
    ///
    /// Not every variable is guaranteed to occur.
    pub fn random_formula(&mut self, target_vars: usize) -> Formula {
        assert!(
            (1..=MAX_VARS).contains(&target_vars),
            "target_vars must be in 1..={}",
            MAX_VARS
        );
        self.random_subtree(target_vars, 0)
    }

    fn random_subtree(&mut self, target_vars: usize, depth: usize) -> Formula {
        if depth >= self.config.max_depth || self.rng.random_bool(LEAF_PROBABILITY) {
            return variable(self.rng.random_range(0..target_vars));
        }
        match self.rng.random_range(0..4) {
            0 => Formula::not(self.random_subtree(target_vars, depth + 1)),
            1 => {
                let a = self.random_subtree(target_vars, depth + 1);
                let b = self.random_subtree(target_vars, depth + 1);
                Formula::and(a, b)
            }
            2 => {
                let a = self.random_subtree(target_vars, depth + 1);
                let b = self.random_subtree(target_vars, depth + 1);
                Formula::or(a, b)
            }
            _ => {
                let a = self.random_subtree(target_vars, depth + 1);
                let b = self.random_subtree(target_vars, depth + 1);
                Formula::implies(a, b)
            }
        }
    }

    /// Random formula in which every variable of a random range occurs.
    ///
    /// Missing variables are added as `f ∨ (v ∨ ¬v)`.
    pub fn formula(&mut self) -> Formula {
        let target = self.target_vars();
        let mut f = self.random_formula(target);
        let used = f.collect_variables();
        for index in 0..target {
            let name = (b'a' + index as u8) as char;
            if !used.contains(&name) {
                f = Formula::or(f, excluded_middle(index));
            }
        }
        f
    }

    /// A tautology over a random number of variables.
    pub fn tautology(&mut self) -> Formula {
        let target = self.target_vars();
        let mut f = match self.rng.random_range(0..3) {
            0 => excluded_middle(0),
            1 => Formula::implies(variable(0), variable(0)),
            _ => Formula::not(Formula::and(variable(0), Formula::not(variable(0)))),
        };
        for index in 1..target {
            f = Formula::and(f, excluded_middle(index));
        }
        f
    }

    /// A contradiction over a random number of variables.
    pub fn contradiction(&mut self) -> Formula {
        let target = self.target_vars();
        let mut f = Formula::and(variable(0), Formula::not(variable(0)));
        for index in 1..target {
            f = Formula::and(f, excluded_middle(index));
        }
        f
    }

    /// `count` labelled instances: tautologies first, then contradictions,
    /// then random formulas.
    pub fn instances(&mut self, count: usize) -> Vec<Instance> {
        let (tautologies, contradictions, _) = split_counts(count);
        debug!("instances({}): {} tautologies, {} contradictions", count, tautologies, contradictions);
        (0..count)
            .map(|i| {
                let (formula, kind) = if i < tautologies {
                    (self.tautology(), InstanceKind::Tautology)
                } else if i < tautologies + contradictions {
                    (self.contradiction(), InstanceKind::Contradiction)
                } else {
                    (self.formula(), InstanceKind::Random)
                };
                Instance::new(format!("{:03}", i), &formula, kind)
            })
            .collect()
    }
}

/// Number of tautologies, contradictions and random formulas in a batch.
///
/// The first two shares are truncated; the remainder is random.
pub fn split_counts(count: usize) -> (usize, usize, usize) {
    let tautologies = (count as f64 * TAUTOLOGY_SHARE) as usize;
    let contradictions = (count as f64 * CONTRADICTION_SHARE) as usize;
    (tautologies, contradictions, count - tautologies - contradictions)
}
