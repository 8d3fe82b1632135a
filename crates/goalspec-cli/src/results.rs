//! Persistent per-state results for `goalspec solve`.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalspec::{Phase, SpecGoalOutcome, Times};
use goalspec_grid::{GridAction, GridState};

pub const RESULTS_FILE: &str = "results.json";
pub const OUTPUT_FILE: &str = "output.txt";

/// Open `output.txt` in the results directory, creating the directory.
///
/// The log is appended to when stored results will be resumed and truncated
/// otherwise.
pub fn open_output_log(results_dir: &Path, redo: bool) -> Result<File> {
    std::fs::create_dir_all(results_dir).with_context(|| {
        format!("Failed to create results directory {}", results_dir.display())
    })?;
    let resume = !redo && results_dir.join(RESULTS_FILE).exists();

    let path = results_dir.join(OUTPUT_FILE);
    let mut options = OpenOptions::new();
    options.create(true);
    if resume {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options
        .open(&path)
        .with_context(|| format!("Failed to open output log {}", path.display()))
}

/// Counters that repeat exactly when a deterministic engine is re-run.
pub fn attempt_signature(outcome: &SpecGoalOutcome<GridState, GridAction>) -> [usize; 4] {
    [
        outcome.num_models_init,
        outcome.num_models_superset,
        outcome.nodes_generated,
        outcome.num_banned,
    ]
}

/// Outcome of solving one start state, merged over all attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateResult {
    pub solved: bool,
    /// Actions of the solution path; absent when unsolved
    pub actions: Option<Vec<GridAction>>,
    pub path_cost: Option<f64>,
    pub num_models_init: usize,
    pub num_models_superset: usize,
    pub nodes_generated: usize,
    pub attempts: usize,
    /// Per-phase seconds summed over attempts
    pub times: Times,
    /// Wall-clock seconds over all attempts
    pub time: f64,
}

impl StateResult {
    /// Fold one orchestrator invocation into this result.
    pub fn merge_attempt(&mut self, outcome: SpecGoalOutcome<GridState, GridAction>) {
        self.attempts += 1;
        self.num_models_init += outcome.num_models_init;
        self.num_models_superset += outcome.num_models_superset;
        self.nodes_generated += outcome.nodes_generated;
        self.times.add_times(&outcome.times);
        self.solved = outcome.solved;
        if outcome.solved {
            self.actions = Some(outcome.path_actions);
            self.path_cost = outcome.path_cost;
        }
    }

    /// Number of actions in the solution, if any.
    pub fn length(&self) -> Option<usize> {
        self.actions.as_ref().map(Vec::len)
    }
}

/// Contents of `results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub spec: String,
    pub spec_fingerprint: String,
    pub states: Vec<GridState>,
    pub results: Vec<StateResult>,
    pub updated_at: DateTime<Utc>,
}

impl ResultsFile {
    pub fn new(spec: &str, spec_fingerprint: &str, states: Vec<GridState>) -> Self {
        Self {
            spec: spec.to_string(),
            spec_fingerprint: spec_fingerprint.to_string(),
            states,
            results: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read results from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse results from {}", path.display()))
    }

    /// Resume stored results unless `redo` is set or none exist yet.
    ///
    /// Stored results must belong to the same specification and start states.
    pub fn open(
        path: &Path,
        spec: &str,
        spec_fingerprint: &str,
        states: &[GridState],
        redo: bool,
    ) -> Result<Self> {
        if redo || !path.exists() {
            return Ok(Self::new(spec, spec_fingerprint, states.to_vec()));
        }

        let mut stored = Self::load(path)?;
        if stored.spec_fingerprint != spec_fingerprint {
            bail!(
                "Results in {} belong to a different specification ({} vs {}); use --redo to start over",
                path.display(),
                stored.spec_fingerprint,
                spec_fingerprint
            );
        }
        if stored.states != states {
            bail!(
                "Results in {} were recorded for different start states; use --redo to start over",
                path.display()
            );
        }
        let resume = stored.resume_index();
        stored.results.truncate(resume);
        Ok(stored)
    }

    /// Index of the first state without a solved result.
    pub fn resume_index(&self) -> usize {
        self.results
            .iter()
            .position(|r| !r.solved)
            .unwrap_or(self.results.len())
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.updated_at = Utc::now();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write results to {}", path.display()))
    }

    pub fn percent_solved(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let solved = self.results.iter().filter(|r| r.solved).count();
        100.0 * solved as f64 / self.results.len() as f64
    }

    /// Mean of `value` over solved states; zero when none are solved.
    pub fn solved_mean(&self, value: impl Fn(&StateResult) -> f64) -> f64 {
        let values: Vec<f64> = self
            .results
            .iter()
            .filter(|r| r.solved)
            .map(value)
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// One-line means over solved states, logged after every state.
    pub fn means_line(&self) -> String {
        format!(
            "Means, SolnCost: {:.2}, # Models init: {:.2}, # Models superset: {:.2}, Solved: {:.2}%, \
             Times - Spec init: {:.2}, Model: {:.2}, Search: {:.2}, Check: {:.2}, Superset: {:.2}, Tot: {:.2}",
            self.solved_mean(|r| r.path_cost.unwrap_or(0.0)),
            self.solved_mean(|r| r.num_models_init as f64),
            self.solved_mean(|r| r.num_models_superset as f64),
            self.percent_solved(),
            self.solved_mean(|r| r.times.get(Phase::SpecInit)),
            self.solved_mean(|r| r.times.get(Phase::ModelSample)),
            self.solved_mean(|r| r.times.get(Phase::Search)),
            self.solved_mean(|r| r.times.get(Phase::Check)),
            self.solved_mean(|r| r.times.get(Phase::ModelSuperset)),
            self.solved_mean(|r| r.time),
        )
    }
}
