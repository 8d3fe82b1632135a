//! goalspec CLI - specification goal search over grid worlds.
//!
//! - `goalspec solve` - solve a list of start states, saving results as it goes
//! - `goalspec compare` - compare two saved result sets

mod report;
mod results;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

use goalspec::{find_spec_goal, SpecGoalConfig};
use goalspec_grid::{GridState, GridWorld, ManhattanHeuristic};
use goalspec_logic::{parse_clauses, spec_fingerprint, validate_spec, Clause};

use crate::results::{attempt_signature, open_output_log, ResultsFile, StateResult, RESULTS_FILE};

#[derive(Parser)]
#[command(name = "goalspec")]
#[command(about = "Specification-guided goal search", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve every start state in a file
    Solve(SolveArgs),

    /// Compare two result files over the same start states
    Compare {
        #[arg(long)]
        soln1: PathBuf,

        #[arg(long)]
        soln2: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// JSON list of start states
    #[arg(long)]
    states: PathBuf,

    /// Grid layout (YAML, or JSON by extension)
    #[arg(long)]
    env: PathBuf,

    /// Goal clauses separated by ';'
    #[arg(long)]
    spec: String,

    /// Directory for results.json, written after every state
    #[arg(long)]
    results_dir: PathBuf,

    /// Extra background knowledge, one fact per line
    #[arg(long)]
    bk_add: Option<PathBuf>,

    /// YAML search configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    model_batch_size: Option<usize>,

    /// Nodes popped per search instance per round
    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    weight: Option<f64>,

    #[arg(long)]
    max_search_iters: Option<usize>,

    #[arg(long)]
    heuristic_batch_size: Option<usize>,

    /// Orchestrator invocations per state before giving up; stops early once
    /// an attempt repeats the previous one exactly
    #[arg(long, default_value_t = 1)]
    max_attempts: usize,

    /// Discard existing results and start over
    #[arg(long)]
    redo: bool,

    /// Log a picture of each start state
    #[arg(long)]
    viz_start: bool,

    /// Log a picture of each reached goal state
    #[arg(long)]
    viz_goal: bool,
}

impl SolveArgs {
    fn resolve_config(&self) -> Result<SpecGoalConfig> {
        let mut config = match &self.config {
            Some(path) => SpecGoalConfig::load(path)?,
            None => SpecGoalConfig::default(),
        };
        if let Some(n) = self.model_batch_size {
            config.model_batch_size = n;
        }
        if let Some(n) = self.batch_size {
            config.search_batch_size = n;
        }
        if let Some(w) = self.weight {
            config.weight = w;
        }
        if let Some(n) = self.max_search_iters {
            config.max_search_iters = n;
        }
        if self.heuristic_batch_size.is_some() {
            config.heuristic_batch_size = self.heuristic_batch_size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `solve` mirrors its log into <results-dir>/output.txt
    let output_log = match &cli.command {
        Commands::Solve(args) => Some(open_output_log(&args.results_dir, args.redo)?),
        Commands::Compare { .. } => None,
    };
    init_logging(cli.verbose, output_log);

    match cli.command {
        Commands::Solve(args) => run_solve(&args),
        Commands::Compare { soln1, soln2 } => run_compare(&soln1, &soln2),
    }
}

fn init_logging(verbose: bool, output_log: Option<File>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let (writer, ansi) = match output_log {
        Some(file) => (BoxMakeWriter::new(std::io::stdout.and(Mutex::new(file))), false),
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .init();
}

fn load_states(path: &Path, world: &GridWorld) -> Result<Vec<GridState>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read states from {}", path.display()))?;
    let states: Vec<GridState> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse states from {}", path.display()))?;
    for (idx, state) in states.iter().enumerate() {
        world
            .check_state(state)
            .with_context(|| format!("Invalid start state {idx} in {}", path.display()))?;
    }
    Ok(states)
}

fn run_solve(args: &SolveArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let world = GridWorld::load(&args.env)?;
    let states = load_states(&args.states, &world)?;

    let clauses = parse_clauses(&args.spec).context("Failed to parse specification")?;
    validate_spec(&clauses)?;
    let fingerprint = spec_fingerprint(&clauses);
    info!(clauses = clauses.len(), fingerprint = %fingerprint, "Parsed specification");

    let path = args.results_dir.join(RESULTS_FILE);
    let mut results = ResultsFile::open(&path, &args.spec, &fingerprint, &states, args.redo)?;

    let start_idx = results.resume_index();
    if start_idx > 0 {
        info!(start_idx, total = states.len(), "Resuming from saved results");
    }

    for (idx, state) in states.iter().enumerate().skip(start_idx) {
        if args.viz_start {
            info!("Start state {idx} {state}:\n{}", world.render(Some(state)));
        }
        let result = solve_state(&world, state, &clauses, &config, args)?;

        info!("{}", result.times);
        info!(
            "State: {idx}, PathCost: {:.2}, # Models init: {}, # Models superset: {}, Solved: {}, Time: {:.2}",
            result.path_cost.unwrap_or(f64::INFINITY),
            result.num_models_init,
            result.num_models_superset,
            result.solved,
            result.time
        );

        results.results.push(result);
        results.save(&path)?;
        info!("{}", results.means_line());
    }

    Ok(())
}

fn solve_state(
    world: &GridWorld,
    start: &GridState,
    clauses: &[Clause],
    config: &SpecGoalConfig,
    args: &SolveArgs,
) -> Result<StateResult> {
    let started = Instant::now();
    let mut result = StateResult::default();
    let mut previous = None;

    while result.attempts < args.max_attempts.max(1) {
        let outcome = find_spec_goal(
            world,
            start,
            clauses,
            &ManhattanHeuristic,
            config,
            args.bk_add.as_deref(),
        )?;
        if args.viz_goal {
            if let Some(goal) = outcome.path_states.last() {
                info!("Goal state {goal}:\n{}", world.render(Some(goal)));
            }
        }

        let signature = attempt_signature(&outcome);
        result.merge_attempt(outcome);
        if result.solved {
            break;
        }
        if previous == Some(signature) {
            debug!(attempts = result.attempts, "Attempt repeated the previous one, giving up");
            break;
        }
        previous = Some(signature);
    }

    result.time = started.elapsed().as_secs_f64();
    Ok(result)
}

fn run_compare(soln1: &Path, soln2: &Path) -> Result<()> {
    let first = ResultsFile::load(soln1)?;
    let second = ResultsFile::load(soln2)?;
    println!("{}", report::compare(&first, &second)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("search.yaml");
        std::fs::write(&config_path, "weight: 0.5\nmax_search_iters: 7\n").unwrap();

        let cli = Cli::try_parse_from([
            "goalspec",
            "solve",
            "--states",
            "states.json",
            "--env",
            "grid.yaml",
            "--spec",
            "goal :- at(1,1)",
            "--results-dir",
            "out",
            "--config",
            config_path.to_str().unwrap(),
            "--weight",
            "1.0",
            "--batch-size",
            "8",
        ])
        .unwrap();

        let Commands::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        let config = args.resolve_config().unwrap();
        assert_eq!(config.weight, 1.0);
        assert_eq!(config.max_search_iters, 7);
        assert_eq!(config.search_batch_size, 8);
        assert_eq!(config.model_batch_size, 1);
        assert_eq!(args.max_attempts, 1);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let cli = Cli::try_parse_from([
            "goalspec",
            "solve",
            "--states",
            "s.json",
            "--env",
            "g.yaml",
            "--spec",
            "goal :- at(1,1)",
            "--results-dir",
            "out",
            "--weight",
            "1.5",
        ])
        .unwrap();
        let Commands::Solve(args) = cli.command else {
            panic!("expected solve");
        };
        assert!(args.resolve_config().is_err());
    }
}
