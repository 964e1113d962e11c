//! Truth-table rows.
//!
//! Row `i` of the table for `n` variables assigns to variable `j` the bit
//! `n - 1 - j` of `i`, so the first variable is the most significant one:
//!
//! ```text
//! i | x0 x1
//! --+------
//! 0 |  0  0
//! 1 |  0  1
//! 2 |  1  0
//! 3 |  1  1
//! ```
//!
//! The [`TruthTable`] iterator produces rows lazily by counting in binary over
//! a `Vec<bool>`, so it works for any number of variables and never holds more
//! than one row. [`generate_truth_table`] materializes the whole table.
//!
//! Note: the number of rows is exponential in the number of variables.

use num_bigint::BigUint;

/// Number of rows in the truth table over `num_vars` variables, i.e. `2^num_vars`.
pub fn row_count(num_vars: usize) -> BigUint {
    BigUint::from(1u32) << num_vars
}

/// All `2^num_vars` rows, in order.
pub fn generate_truth_table(num_vars: usize) -> Vec<Vec<bool>> {
    TruthTable::new(num_vars).collect()
}

/// Lazy iterator over truth-table rows.
#[derive(Debug, Clone)]
pub struct TruthTable {
    row: Vec<bool>,
    done: bool,
}

impl TruthTable {
    pub fn new(num_vars: usize) -> Self {
        Self {
            row: vec![false; num_vars],
            done: false,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.row.len()
    }
}

impl Iterator for TruthTable {
    type Item = Vec<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.row.clone();

        // Binary increment, least significant bit last.
        self.done = true;
        for bit in self.row.iter_mut().rev() {
            if *bit {
                *bit = false;
            } else {
                *bit = true;
                self.done = false;
                break;
            }
        }

        Some(current)
    }
}
