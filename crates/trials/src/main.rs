//! Experiment harness for the UCT engine.
//!
//! Runs repeated seeded searches on a reference problem, in parallel, and
//! reports per-trial outcomes plus aggregate statistics.

mod trial;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use trial::{run_trials, Summary, TrialRecord, TrialReport, TrialSettings, Variant};
use uct_core::Problem;
use uct_mcts::problems::{DecisionTree, SubsetSelection};
use uct_mcts::{BudgetSpec, MctsConfig};

/// Iterations per trial when neither budget flag is given.
const DEFAULT_ITERATIONS: u64 = 1000;

/// UCT trial runner.
#[derive(Parser)]
#[command(name = "uct-trials")]
#[command(about = "Run seeded MCTS trials on reference problems")]
struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run independent trials and summarise them.
    Run {
        /// Reference problem to search.
        #[arg(short, long, value_enum, default_value_t = ProblemKind::Subset)]
        problem: ProblemKind,

        /// Number of independent trials.
        #[arg(short, long, default_value = "10")]
        trials: usize,

        /// Iterations per trial.
        #[arg(short, long, conflicts_with = "millis")]
        iterations: Option<u64>,

        /// Wall-clock budget per trial, in milliseconds.
        #[arg(long)]
        millis: Option<u64>,

        /// Reward and bandit pairing.
        #[arg(short, long, value_enum, default_value_t = Variant::Ucb1)]
        variant: Variant,

        /// Exploration constant (defaults to the bandit's own).
        #[arg(long)]
        exploration: Option<f64>,

        /// Base seed; trial i uses seed + i. The instance is drawn from seed.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of items for the subset problem.
        #[arg(long, default_value = "20")]
        items: usize,

        /// Capacity as a fraction of total item weight.
        #[arg(long, default_value = "0.5")]
        capacity_ratio: f64,

        /// Depth of the decision-tree problem.
        #[arg(long, default_value = "8")]
        depth: u32,

        /// JSON file with an `MctsConfig`.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write a JSON report here.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProblemKind {
    /// 0/1 knapsack with random items.
    Subset,
    /// Binary decision tree with random leaf values.
    Tree,
}

impl ProblemKind {
    fn name(self) -> &'static str {
        match self {
            ProblemKind::Subset => "subset",
            ProblemKind::Tree => "tree",
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<MctsConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        }
        None => MctsConfig::default(),
    };
    config.validate().context("Invalid MCTS config")?;
    Ok(config)
}

fn budget_spec(iterations: Option<u64>, millis: Option<u64>) -> BudgetSpec {
    match (iterations, millis) {
        (_, Some(ms)) => BudgetSpec::Millis(ms),
        (Some(n), None) => BudgetSpec::Iterations(n),
        (None, None) => BudgetSpec::Iterations(DEFAULT_ITERATIONS),
    }
}

/// Decision tree with leaf values drawn uniformly from `[0, 1)`.
fn random_tree(depth: u32, rng: &mut ChaCha8Rng) -> Result<DecisionTree> {
    let leaves = 1usize
        .checked_shl(depth)
        .with_context(|| format!("Tree depth {depth} is too large"))?;
    let values = (0..leaves).map(|_| rng.gen::<f64>()).collect();
    Ok(DecisionTree::new(depth, values)?)
}

/// Run the trials and report them.
fn run_and_report<P: Problem + Sync>(
    problem: &P,
    problem_name: &str,
    settings: &TrialSettings,
    trials: usize,
    seed: u64,
    optimum: Option<f64>,
    output: Option<&Path>,
) -> Result<()> {
    info!(
        problem = problem_name,
        trials,
        variant = ?settings.variant,
        budget = ?settings.budget,
        "Running trials"
    );

    let start = Instant::now();
    let records = run_trials(problem, settings, trials, seed)?;
    let summary = Summary::from_records(&records, optimum);
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Trials finished");

    print_summary(&records, &summary);

    if let Some(path) = output {
        let report = TrialReport {
            problem: problem_name.to_string(),
            config: settings.config.clone(),
            variant: settings.variant,
            budget: settings.budget,
            base_seed: seed,
            trials: records,
            summary,
        };
        let file =
            File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!(path = ?path, "Report written");
    }

    Ok(())
}

fn print_summary(records: &[TrialRecord], summary: &Summary) {
    for record in records {
        debug!(
            trial = record.index,
            seed = record.seed,
            iterations = record.iterations,
            nodes = record.nodes,
            incumbent = ?record.incumbent,
            best_action = ?record.best_action,
            "Trial complete"
        );
    }

    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));

    println!("================================================");
    println!("Trials:          {}", summary.trials);
    println!("Iterations/run:  {}", fmt(summary.iterations_mean));
    println!("Time/run (ms):   {}", fmt(summary.elapsed_ms_mean));
    println!("Incumbent mean:  {}", fmt(summary.incumbent_mean));
    println!("Incumbent std:   {}", fmt(summary.incumbent_std_dev));
    println!(
        "Incumbent range: [{}, {}]",
        fmt(summary.incumbent_min),
        fmt(summary.incumbent_max)
    );
    if let Some(optimum) = summary.optimum {
        println!("Optimum:         {optimum:.4}");
    }
    println!("================================================");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            problem,
            trials,
            iterations,
            millis,
            variant,
            exploration,
            seed,
            items,
            capacity_ratio,
            depth,
            config,
            output,
        } => {
            let settings = TrialSettings {
                config: load_config(config.as_deref())?,
                variant,
                budget: budget_spec(iterations, millis),
                exploration,
            };
            let mut instance_rng = ChaCha8Rng::seed_from_u64(seed);
            let output = output.as_deref();

            match problem {
                ProblemKind::Subset => {
                    let instance = SubsetSelection::random(items, capacity_ratio, &mut instance_rng);
                    let optimum = instance.optimum();
                    run_and_report(
                        &instance,
                        problem.name(),
                        &settings,
                        trials,
                        seed,
                        Some(optimum),
                        output,
                    )
                }
                ProblemKind::Tree => {
                    let instance = random_tree(depth, &mut instance_rng)?;
                    let optimum = instance.leaf_values().iter().copied().fold(f64::NAN, f64::max);
                    run_and_report(
                        &instance,
                        problem.name(),
                        &settings,
                        trials,
                        seed,
                        Some(optimum),
                        output,
                    )
                }
            }
        }
    }
}
