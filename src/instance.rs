//! Instance files.
//!
//! An instance file holds one labelled formula per line:
//!
//! ```text
//! # Instance file: boolean tautologies
//! # Format: ID|FORMULA|TYPE|NUM_VARS
//! #
//! 000|((a ∨ ¬a) ∧ (b ∨ ¬b))|TAUTOLOGY|2
//! 001|(a ∧ ¬a)|CONTRADICTION|1
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. The first line is
//! always [`HEADER`], which tells instance files apart from single-formula
//! files (whose first line is the formula itself).

use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use thiserror::Error;

use crate::ast::Formula;
use crate::parser::{parse, SyntaxError};

pub const HEADER: &str = "# Instance file: boolean tautologies";
pub const FORMAT_LINE: &str = "# Format: ID|FORMULA|TYPE|NUM_VARS";

const SEPARATOR: char = '|';

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("instance not found: {0}")]
    NotFound(String),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

pub type Result<T> = std::result::Result<T, InstanceError>;

/// Expected class of an instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InstanceKind {
    Tautology,
    Contradiction,
    Random,
}

impl InstanceKind {
    /// Whether a tautology check result agrees with the label.
    ///
    /// `Random` agrees with either outcome and `Contradiction` with "not a
    /// tautology".
    pub fn is_consistent(self, is_tautology: bool) -> bool {
        is_tautology == (self == InstanceKind::Tautology)
            || is_tautology == (self == InstanceKind::Random)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceKind::Tautology => "TAUTOLOGY",
            InstanceKind::Contradiction => "CONTRADICTION",
            InstanceKind::Random => "RANDOM",
        }
    }
}

impl fmt::Display for InstanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "TAUTOLOGY" => Ok(InstanceKind::Tautology),
            "CONTRADICTION" => Ok(InstanceKind::Contradiction),
            "RANDOM" => Ok(InstanceKind::Random),
            _ => Err(format!("unknown instance type {:?}", s)),
        }
    }
}

/// One line of an instance file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Instance {
    pub id: String,
    /// Formula text, parsed on demand.
    pub formula: String,
    pub kind: InstanceKind,
    /// Number of distinct variables, as recorded in the file.
    pub num_vars: usize,
}

impl Instance {
    pub fn new(id: impl Into<String>, formula: &Formula, kind: InstanceKind) -> Self {
        Self {
            id: id.into(),
            formula: formula.to_string(),
            kind,
            num_vars: formula.collect_variables().len(),
        }
    }

    pub fn parse_formula(&self) -> std::result::Result<Formula, SyntaxError> {
        parse(&self.formula)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{id}{sep}{formula}{sep}{kind}{sep}{num_vars}",
            id = self.id,
            formula = self.formula,
            kind = self.kind,
            num_vars = self.num_vars,
            sep = SEPARATOR,
        )
    }
}

/// Whether `line` (the first line of a file) marks an instance file.
pub fn is_instance_header(line: &str) -> bool {
    line.trim().starts_with(HEADER)
}

/// Parses the contents of an instance file.
///
/// Lines with fewer than four fields are skipped with a warning; a bad type or
/// variable count is an error.
pub fn parse_instances(text: &str) -> Result<Vec<Instance>> {
    let mut instances = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
        if fields.len() < 4 {
            warn!("line {}: expected 4 fields, found {}, skipping", line_no, fields.len());
            continue;
        }

        let kind = fields[2]
            .parse::<InstanceKind>()
            .map_err(|reason| InstanceError::Malformed { line: line_no, reason })?;
        let num_vars = fields[3]
            .parse::<usize>()
            .map_err(|e| InstanceError::Malformed {
                line: line_no,
                reason: format!("bad variable count {:?}: {}", fields[3], e),
            })?;

        instances.push(Instance {
            id: fields[0].to_string(),
            formula: fields[1].to_string(),
            kind,
            num_vars,
        });
    }
    debug!("parsed {} instances", instances.len());
    Ok(instances)
}

pub fn read_instances(path: impl AsRef<Path>) -> Result<Vec<Instance>> {
    let path = path.as_ref();
    debug!("read_instances({})", path.display());
    let text = fs::read_to_string(path)?;
    parse_instances(&text)
}

/// The instance with the given id.
pub fn find_instance(instances: &[Instance], id: &str) -> Result<Instance> {
    instances
        .iter()
        .find(|inst| inst.id == id)
        .cloned()
        .ok_or_else(|| InstanceError::NotFound(id.to_string()))
}

/// Writes [`HEADER`], one comment line per note, the format line, and then the
/// instances.
pub fn write_instances<W: Write>(mut out: W, instances: &[Instance], notes: &[String]) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for note in notes {
        writeln!(out, "# {}", note)?;
    }
    writeln!(out, "{}", FORMAT_LINE)?;
    writeln!(out, "#")?;
    for instance in instances {
        writeln!(out, "{}", instance)?;
    }
    out.flush()
}

fn first_line(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(fs::File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line)
}

/// The formula of a single-formula file: its first line, trimmed.
pub fn read_formula(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    debug!("read_formula({})", path.display());
    Ok(first_line(path)?.trim().to_string())
}

pub fn is_instance_file(path: impl AsRef<Path>) -> Result<bool> {
    Ok(is_instance_header(&first_line(path.as_ref())?))
}
