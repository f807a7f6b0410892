//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

/// Parameters of a single model run. Fixed once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Number of features per culture
    pub features: usize,
    /// Exclusive upper bound on feature values
    pub feature_range: u32,
    /// Number of cycles to run
    pub cycles: u64,
    /// Cycle indices at which a snapshot is handed to the renderer
    pub checkpoints: BTreeSet<u64>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            features: 5,
            feature_range: 10,
            cycles: 100_000,
            checkpoints: BTreeSet::new(),
            seed: 0,
        }
    }
}

impl ModelConfig {
    /// Reject configurations that would produce a degenerate grid or an
    /// unsatisfiable convergence search.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be at least 1".to_string()));
        }
        if self.features == 0 {
            return Err(Error::InvalidConfig("features must be at least 1".to_string()));
        }
        if self.feature_range == 0 {
            return Err(Error::InvalidConfig(
                "feature_range must be at least 1".to_string(),
            ));
        }
        if self.cell_values().is_none() {
            return Err(Error::InvalidConfig(format!(
                "a {0}x{0} grid with {1} features does not fit in memory",
                self.grid_size, self.features
            )));
        }

        let unreachable: Vec<u64> = self
            .checkpoints
            .range(self.cycles..)
            .copied()
            .collect();
        if !unreachable.is_empty() {
            warn!(
                cycles = self.cycles,
                checkpoints = ?unreachable,
                "Checkpoints at or beyond the cycle count will never fire"
            );
        }

        Ok(())
    }

    /// Total feature values stored by the grid, or `None` on overflow
    fn cell_values(&self) -> Option<usize> {
        self.grid_size
            .checked_mul(self.grid_size)
            .and_then(|sites| sites.checked_mul(self.features))
    }
}

/// Runner process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Model parameters for the run
    pub model: ModelConfig,
    /// Export sampled spans to stdout through OpenTelemetry
    pub otel_enabled: bool,
    /// Log a summary line for every snapshot
    pub log_snapshots: bool,
    /// Where to write the JSON run summary, if anywhere
    pub summary_path: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            otel_enabled: false,
            log_snapshots: true,
            summary_path: None,
        }
    }
}

impl RunnerConfig {
    /// Load a runner configuration from a JSON file. Missing fields take
    /// their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: RunnerConfig = serde_json::from_str(&contents)?;
        config.model.validate()?;
        Ok(config)
    }
}
