use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Orchestrator phases with accumulated wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SpecInit,
    ModelSample,
    Search,
    Check,
    ModelSuperset,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::SpecInit,
        Phase::ModelSample,
        Phase::Search,
        Phase::Check,
        Phase::ModelSuperset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::SpecInit => "Spec init",
            Phase::ModelSample => "Model samp",
            Phase::Search => "Search",
            Phase::Check => "Check",
            Phase::ModelSuperset => "Model superset",
        }
    }
}

/// Seconds spent per phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Times {
    secs: BTreeMap<Phase, f64>,
}

impl Times {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        *self.secs.entry(phase).or_insert(0.0) += elapsed.as_secs_f64();
    }

    /// Merge another accumulator into this one.
    pub fn add_times(&mut self, other: &Times) {
        for (phase, secs) in &other.secs {
            *self.secs.entry(*phase).or_insert(0.0) += secs;
        }
    }

    pub fn get(&self, phase: Phase) -> f64 {
        self.secs.get(&phase).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.secs.values().sum()
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Times - ")?;
        for phase in Phase::ALL {
            write!(f, "{}: {:.2}, ", phase.label(), self.get(phase))?;
        }
        write!(f, "Total: {:.2}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_merges_per_phase() {
        let mut a = Times::new();
        a.record(Phase::Search, Duration::from_millis(1500));
        a.record(Phase::Search, Duration::from_millis(500));

        let mut b = Times::new();
        b.record(Phase::Check, Duration::from_millis(250));
        b.record(Phase::Search, Duration::from_secs(1));

        a.add_times(&b);
        assert_eq!(a.get(Phase::Search), 3.0);
        assert_eq!(a.get(Phase::Check), 0.25);
        assert_eq!(a.get(Phase::SpecInit), 0.0);
        assert_eq!(a.total(), 3.25);
    }

    #[test]
    fn summary_line_lists_every_phase() {
        let mut times = Times::new();
        times.record(Phase::ModelSample, Duration::from_millis(120));
        assert_eq!(
            times.to_string(),
            "Times - Spec init: 0.00, Model samp: 0.12, Search: 0.00, Check: 0.00, \
             Model superset: 0.00, Total: 0.12"
        );
    }
}
