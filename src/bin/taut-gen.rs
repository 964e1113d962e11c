use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::info;

use taut_rs::generator::{split_counts, FormulaGenerator, GeneratorConfig};
use taut_rs::instance::write_instances;

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate random tautology benchmark instances")]
struct Cli {
    /// Number of instances.
    #[arg(value_name = "COUNT")]
    count: usize,

    /// Minimum number of distinct variables (a-z).
    #[arg(value_name = "MIN_VARS")]
    min_vars: usize,

    /// Maximum number of distinct variables (a-z).
    #[arg(value_name = "MAX_VARS")]
    max_vars: usize,

    /// Maximum depth of random syntax trees.
    #[arg(value_name = "MAX_DEPTH")]
    max_depth: usize,

    /// Random seed (default: current unix time).
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// Output file (default: `instances_<unix-time>.txt`).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    info!("args = {:?}", args);

    let config = GeneratorConfig::new(args.min_vars, args.max_vars, args.max_depth)?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let seed = args.seed.unwrap_or(now);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("instances_{}.txt", now)));

    let (tautologies, contradictions, random) = split_counts(args.count);
    println!("Generating {} instances...", args.count);
    println!(
        "Parameters: min_vars={}, max_vars={}, max_depth={}, seed={}",
        config.min_vars(), config.max_vars(), config.max_depth(), seed
    );
    println!(
        "Distribution: {} tautologies, {} contradictions, {} random",
        tautologies, contradictions, random
    );

    let mut generator = FormulaGenerator::new(config, seed);
    let instances = generator.instances(args.count);

    let notes = vec![
        format!("Generated at unix time {}", now),
        format!(
            "Parameters: {} instances, {}-{} variables, depth {}, seed {}",
            args.count, config.min_vars(), config.max_vars(), config.max_depth(), seed
        ),
        "Distribution: 70% tautologies, 20% contradictions, 10% random".to_string(),
    ];

    let file = File::create(&output).wrap_err_with(|| format!("Could not create {}", output.display()))?;
    write_instances(BufWriter::new(file), &instances, &notes)?;

    for instance in &instances {
        println!(
            "Instance {}: {} - {} vars - {}",
            instance.id, instance.kind, instance.num_vars, instance.formula
        );
    }

    println!();
    println!("Done. Wrote {} instances to {}", instances.len(), output.display());

    Ok(())
}
