//! Orchestrator configuration loading.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::SpecGoalError;

/// Tuning knobs for one specification goal search, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecGoalConfig {
    /// Models sampled per round (initial sample and superset budget)
    pub model_batch_size: usize,

    /// Nodes popped per search instance per round
    pub search_batch_size: usize,

    /// Path-cost weight of the weighted A* priority, within [0, 1]
    pub weight: f64,

    /// Search rounds before an unfinished candidate is abandoned
    pub max_search_iters: usize,

    /// Chunk size for heuristic evaluation; unbounded when absent
    pub heuristic_batch_size: Option<usize>,
}

impl Default for SpecGoalConfig {
    fn default() -> Self {
        Self {
            model_batch_size: 1,
            search_batch_size: 100,
            weight: 0.2,
            max_search_iters: 100,
            heuristic_batch_size: None,
        }
    }
}

impl SpecGoalConfig {
    /// Load from a YAML file; missing keys take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SpecGoalError> {
        if self.model_batch_size == 0 {
            return Err(SpecGoalError::Config(
                "model_batch_size must be at least 1".to_string(),
            ));
        }
        if self.search_batch_size == 0 {
            return Err(SpecGoalError::Config(
                "search_batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_search_iters == 0 {
            return Err(SpecGoalError::Config(
                "max_search_iters must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(SpecGoalError::Config(format!(
                "weight must be within [0, 1], got {}",
                self.weight
            )));
        }
        if self.heuristic_batch_size == Some(0) {
            return Err(SpecGoalError::Config(
                "heuristic_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
