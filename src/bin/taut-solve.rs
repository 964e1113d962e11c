use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::{info, warn};

use taut_rs::config::TimeBudget;
use taut_rs::eval::{EvalError, Evaluator, Metrics};
use taut_rs::instance::{find_instance, is_instance_file, read_formula, read_instances, InstanceKind};
use taut_rs::parser::parse;
use taut_rs::truth_table::row_count;

/// Formulas with more variables than this get a warning in verbose mode.
const MANY_VARS: usize = 20;

#[derive(Debug, Parser)]
#[command(author, version, about = "Check whether propositional formulas are tautologies")]
struct Cli {
    /// Formula file (first line is the formula) or instance file.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Time limit per formula, in seconds.
    #[arg(short, long, value_name = "SECS", default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Check only the instance with this id.
    #[arg(short, long, value_name = "ID")]
    instance: Option<String>,

    /// Check all instances of the file.
    #[arg(short, long)]
    all: bool,

    /// Show the formula, its variables and the number of rows (debug logging).
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,

    /// Print the syntax tree.
    #[arg(short, long)]
    debug: bool,

    /// With --all, print only the final summary.
    #[arg(short, long)]
    summary: bool,
}

/// Result of one bounded check.
struct Report {
    /// `None` on timeout.
    is_tautology: Option<bool>,
    micros: u128,
    metrics: Metrics,
}

impl Report {
    fn print(&self, id: &str) {
        println!("=== RESULT ===");
        println!("Instance: {}", id);
        match self.is_tautology {
            Some(is_taut) => println!("Tautology: {}", if is_taut { "YES" } else { "NO" }),
            None => println!("Status: TIMEOUT (could not decide in time)"),
        }
        println!("Time: {} µs", self.micros);
        println!("Evaluations: {}", self.metrics.evaluations);
        println!("Variable lookups: {}", self.metrics.variable_lookups);
        println!("Stack operations: {}", self.metrics.stack_operations);
        println!("Max stack size: {}", self.metrics.max_stack_size);
        println!("==============");
        println!();
    }
}

fn describe(is_tautology: bool) -> &'static str {
    if is_tautology {
        "tautology"
    } else {
        "not a tautology"
    }
}

/// Parses and checks one formula, printing the report unless `quiet`.
fn check(
    text: &str,
    id: &str,
    kind: Option<InstanceKind>,
    args: &Cli,
    quiet: bool,
) -> color_eyre::Result<Report> {
    let verbose = args.verbose && !quiet;
    if verbose {
        println!("=== FORMULA {} ===", id);
        println!("Formula: {}", text);
        println!("Timeout: {} s", args.timeout);
        if let Some(kind) = kind {
            println!("Expected type: {}", kind);
        }
    }

    let formula = parse(text).wrap_err_with(|| format!("Failed to parse formula {}", id))?;

    if args.debug {
        println!("=== SYNTAX TREE ===");
        formula.print(0);
        println!("===================");
    }

    let mut variables = formula.collect_variables();
    variables.sort_unstable();

    if verbose {
        let names: Vec<String> = variables.iter().map(|c| c.to_string()).collect();
        println!("Variables ({}): {}", variables.len(), names.join(", "));
        println!("Rows to check: {}", row_count(variables.len()));
        if variables.len() > MANY_VARS {
            warn!(
                "formula has many variables ({}), it may exceed the timeout",
                variables.len()
            );
        }
    }

    let limit = TimeBudget::from_secs(args.timeout);
    let mut evaluator = Evaluator::new();
    let start = Instant::now();
    let result = evaluator.is_tautology_with_timeout(&formula, &variables, &limit);
    let micros = start.elapsed().as_micros();

    let is_tautology = match result {
        Ok(is_taut) => Some(is_taut),
        Err(EvalError::Timeout { elapsed, cause }) => {
            warn!("{}: timeout after {:?} ({})", id, elapsed, cause);
            None
        }
        Err(e) => return Err(e.into()),
    };
    let report = Report {
        is_tautology,
        micros,
        metrics: *evaluator.metrics(),
    };

    if !quiet {
        report.print(id);
        if let (Some(kind), Some(is_taut)) = (kind, is_tautology) {
            if kind.is_consistent(is_taut) {
                println!("✓ Result consistent with expected type");
            } else {
                println!(
                    "WARNING: inconsistent result! Expected: {}, got: {}",
                    describe(kind == InstanceKind::Tautology),
                    describe(is_taut)
                );
            }
        }
    }

    Ok(report)
}

fn log_level(args: &Cli) -> simplelog::LevelFilter {
    if args.verbose {
        simplelog::LevelFilter::Debug
    } else if args.quiet {
        simplelog::LevelFilter::Warn
    } else {
        simplelog::LevelFilter::Info
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        log_level(&args),
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    info!("args = {:?}", args);

    let is_batch = is_instance_file(&args.file)
        .wrap_err_with(|| format!("Could not open {}", args.file.display()))?;

    if !is_batch {
        let text = read_formula(&args.file)?;
        let id = args.file.display().to_string();
        check(&text, &id, None, &args, false)?;
        return Ok(());
    }

    let instances = read_instances(&args.file)?;

    if let Some(id) = &args.instance {
        let instance = find_instance(&instances, id)?;
        check(&instance.formula, &instance.id, Some(instance.kind), &args, false)?;
    } else if args.all {
        println!(
            "Checking {} instances with a timeout of {} s each...",
            instances.len(),
            args.timeout
        );

        let mut processed = 0;
        let mut timeouts = 0;
        let mut tautologies = 0;
        for instance in &instances {
            let report = check(&instance.formula, &instance.id, Some(instance.kind), &args, args.summary)?;
            match report.is_tautology {
                Some(is_taut) => {
                    processed += 1;
                    if is_taut {
                        tautologies += 1;
                    }
                }
                None => {
                    timeouts += 1;
                    if !args.summary {
                        println!("Instance {} exceeded the timeout", instance.id);
                    }
                }
            }
        }

        println!();
        println!("=== SUMMARY ===");
        println!("Total instances: {}", instances.len());
        println!("Processed: {}", processed);
        println!("Timeouts: {}", timeouts);
        println!("Tautologies found: {}", tautologies);
        println!("===============");
    } else {
        println!("File contains {} instances.", instances.len());
        println!("Timeout: {} s", args.timeout);
        println!("Use -a to check all of them or -i ID to check one.");
    }

    Ok(())
}
