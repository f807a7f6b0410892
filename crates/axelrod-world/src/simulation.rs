//! Simulation engine for one run of the model.

use crate::grid::Grid;
use crate::random::RandomSource;
use crate::snapshot::{Renderer, Snapshot, SnapshotKind};
use crate::stats::GridStats;
use crate::topology::neighbors;
use axelrod_core::{Error, ModelConfig, Result, Site};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

/// Cycles between progress log lines
const PROGRESS_INTERVAL: u64 = 10_000;

pub struct Simulation<R = ChaCha8Rng> {
    grid: Grid,
    config: ModelConfig,
    rng: R,
    cycle: u64,
    interactions: u64,
    convergences: u64,
}

impl Simulation<ChaCha8Rng> {
    /// Create a simulation seeded from `config.seed` with a freshly
    /// initialized grid.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Create a simulation drawing all randomness from `rng`. The grid is
    /// initialized from the same source.
    pub fn with_rng(config: ModelConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let grid = Grid::random(&config, &mut rng);
        Ok(Self::assemble(config, grid, rng))
    }

    /// Create a simulation over an existing grid
    pub fn from_grid(config: ModelConfig, grid: Grid, rng: R) -> Result<Self> {
        config.validate()?;

        if grid.size() != config.grid_size || grid.features() != config.features {
            return Err(Error::InvalidConfig(format!(
                "grid is {0}x{0} with {1} features, config expects {2}x{2} with {3}",
                grid.size(),
                grid.features(),
                config.grid_size,
                config.features
            )));
        }
        if grid.max_value().is_some_and(|v| v >= config.feature_range) {
            return Err(Error::InvalidConfig(format!(
                "grid holds values outside [0, {})",
                config.feature_range
            )));
        }

        Ok(Self::assemble(config, grid, rng))
    }

    fn assemble(config: ModelConfig, grid: Grid, rng: R) -> Self {
        Self {
            grid,
            config,
            rng,
            cycle: 0,
            interactions: 0,
            convergences: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Number of cycles executed so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn snapshot(&self, kind: SnapshotKind) -> Snapshot {
        Snapshot::new(self.cycle, kind, self.config.feature_range, self.grid.clone())
    }

    fn snapshot_at(&self, cycle: u64, kind: SnapshotKind) -> Snapshot {
        Snapshot::new(cycle, kind, self.config.feature_range, self.grid.clone())
    }

    /// Pick a site uniformly at random, drawing x then y
    pub fn random_site(&mut self) -> Site {
        let n = self.config.grid_size;
        let x = self.rng.index(n);
        let y = self.rng.index(n);
        Site::new(x, y)
    }

    /// Decide whether two sites interact. The probability equals their
    /// similarity.
    pub fn interacts(&mut self, site1: Site, site2: Site) -> bool {
        let similarity = self.grid.similarity(site1, site2);
        self.rng.unit() <= similarity
    }

    /// Copy one randomly chosen differing feature of `site2` onto `site1`.
    ///
    /// Returns the feature position that changed, or `None` when the
    /// cultures were already identical. `site2` is never modified.
    pub fn converge(&mut self, site1: Site, site2: Site) -> Option<usize> {
        let differing = self.grid.differing_features(site1, site2);
        if differing.is_empty() {
            return None;
        }

        let feature = differing[self.rng.index(differing.len())];
        self.grid.copy_feature(site1, site2, feature);
        Some(feature)
    }

    /// Run one cycle: pick an active site and let it interact with each of
    /// its neighbors in turn. Returns the number of features changed.
    pub fn step(&mut self) -> usize {
        let active = self.random_site();
        let mut changed = 0;

        for neighbor in neighbors(self.config.grid_size, active) {
            if !self.interacts(active, neighbor) {
                continue;
            }
            self.interactions += 1;

            if let Some(feature) = self.converge(active, neighbor) {
                changed += 1;
                trace!(
                    cycle = self.cycle,
                    active = %active,
                    neighbor = %neighbor,
                    feature,
                    "Feature converged"
                );
            }
        }

        self.convergences += changed as u64;
        self.cycle += 1;
        changed
    }

    /// Run every configured cycle, handing snapshots to `renderer` at each
    /// checkpoint and once after the last cycle.
    ///
    /// The grid must be untouched: a simulation that has already been
    /// stepped is rejected with `Error::InvalidState`.
    #[instrument(skip(self, renderer), fields(cycles = self.config.cycles, grid_size = self.config.grid_size))]
    pub fn run<V: Renderer + ?Sized>(mut self, renderer: &mut V) -> Result<SimulationResult> {
        if self.cycle != 0 {
            return Err(Error::InvalidState(format!(
                "run must start from a fresh grid, {} cycles already executed",
                self.cycle
            )));
        }

        info!(
            features = self.config.features,
            feature_range = self.config.feature_range,
            checkpoints = self.config.checkpoints.len(),
            "Starting simulation for {} cycles",
            self.config.cycles
        );

        for i in 0..self.config.cycles {
            if self.config.checkpoints.contains(&i) {
                info!(cycle = i, "Checkpoint reached");
                renderer.render(&self.snapshot_at(i, SnapshotKind::Checkpoint))?;
            }

            self.step();

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                debug!(
                    cycle = i + 1,
                    interactions = self.interactions,
                    convergences = self.convergences,
                    "Simulation progress"
                );
            }
        }

        let cycles_run = self.config.cycles;
        let snapshot = self.snapshot_at(cycles_run, SnapshotKind::Final);
        renderer.render(&snapshot)?;

        let result = SimulationResult {
            cycles_run,
            interactions: self.interactions,
            convergences: self.convergences,
            stats: snapshot.stats(),
            snapshot,
        };
        result.log_summary();

        Ok(result)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub cycles_run: u64,
    /// Neighbor draws that resulted in an interaction
    pub interactions: u64,
    /// Interactions that changed a feature
    pub convergences: u64,
    pub stats: GridStats,
    pub snapshot: Snapshot,
}

impl SimulationResult {
    pub fn grid(&self) -> &Grid {
        &self.snapshot.grid
    }

    fn log_summary(&self) {
        info!(
            event = "run_summary",
            cycles_run = self.cycles_run,
            interactions = self.interactions,
            convergences = self.convergences,
            regions = self.stats.regions,
            distinct_cultures = self.stats.distinct_cultures,
            mean_similarity = format!("{:.3}", self.stats.mean_similarity),
            frozen = self.stats.frozen,
            "Simulation complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotRecorder;

    fn small_config() -> ModelConfig {
        ModelConfig {
            grid_size: 4,
            features: 3,
            feature_range: 3,
            cycles: 500,
            seed: 11,
            ..Default::default()
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(small_config()).unwrap();
        assert_eq!(sim.grid().size(), 4);
        assert_eq!(sim.grid().features(), 3);
        assert_eq!(sim.cycle(), 0);
    }

    #[test]
    fn test_zero_features_fails_fast() {
        let config = ModelConfig {
            features: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_grid_checks_shape() {
        let config = ModelConfig {
            grid_size: 2,
            features: 2,
            feature_range: 3,
            ..Default::default()
        };
        let rng = ChaCha8Rng::seed_from_u64(0);

        assert!(Simulation::from_grid(config.clone(), Grid::new(3, 2), rng.clone()).is_err());
        assert!(Simulation::from_grid(config.clone(), Grid::new(2, 1), rng.clone()).is_err());

        let out_of_range = Grid::from_cultures(2, vec![vec![0, 3], vec![0, 0], vec![0, 0], vec![0, 0]])
            .unwrap();
        assert!(Simulation::from_grid(config.clone(), out_of_range, rng.clone()).is_err());

        assert!(Simulation::from_grid(config, Grid::new(2, 2), rng).is_ok());
    }

    #[test]
    fn test_step_advances_cycle() {
        let mut sim = Simulation::new(small_config()).unwrap();
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(sim.cycle(), 10);
    }

    #[test]
    fn test_converge_identical_is_noop() {
        let config = ModelConfig {
            grid_size: 2,
            features: 3,
            feature_range: 5,
            ..Default::default()
        };
        let grid = Grid::from_cultures(
            2,
            vec![vec![1, 2, 3], vec![1, 2, 3], vec![4, 4, 4], vec![0, 0, 0]],
        )
        .unwrap();
        let mut sim = Simulation::from_grid(config, grid.clone(), ChaCha8Rng::seed_from_u64(3))
            .unwrap();

        assert_eq!(sim.converge(Site::new(0, 0), Site::new(1, 0)), None);
        assert_eq!(sim.grid(), &grid);
    }

    #[test]
    fn test_converge_reduces_difference_by_one() {
        let config = ModelConfig {
            grid_size: 2,
            features: 6,
            feature_range: 9,
            ..Default::default()
        };
        let grid = Grid::from_cultures(
            2,
            vec![
                vec![0, 1, 2, 3, 4, 5],
                vec![0, 8, 2, 7, 4, 6],
                vec![1, 1, 1, 1, 1, 1],
                vec![2, 2, 2, 2, 2, 2],
            ],
        )
        .unwrap();
        let mut sim =
            Simulation::from_grid(config, grid.clone(), ChaCha8Rng::seed_from_u64(9)).unwrap();
        let (a, b) = (Site::new(0, 0), Site::new(1, 0));

        let mut remaining = 3;
        while remaining > 0 {
            let feature = sim.converge(a, b).unwrap();
            assert!([1, 3, 5].contains(&feature));
            remaining -= 1;
            assert_eq!(sim.grid().differing_features(a, b).len(), remaining);
            assert_eq!(sim.grid().culture(b), grid.culture(b));
            assert_eq!(sim.grid().culture(Site::new(0, 1)), grid.culture(Site::new(0, 1)));
            assert_eq!(sim.grid().culture(Site::new(1, 1)), grid.culture(Site::new(1, 1)));
        }
        assert_eq!(sim.converge(a, b), None);
    }

    #[test]
    fn test_interacts_extremes() {
        let config = ModelConfig {
            grid_size: 2,
            features: 2,
            feature_range: 4,
            ..Default::default()
        };
        let grid = Grid::from_cultures(2, vec![vec![1, 1], vec![1, 1], vec![2, 2], vec![3, 3]])
            .unwrap();
        let mut sim = Simulation::from_grid(config, grid, ChaCha8Rng::seed_from_u64(5)).unwrap();

        // Identical cultures always interact
        for _ in 0..100 {
            assert!(sim.interacts(Site::new(0, 0), Site::new(1, 0)));
        }
    }

    #[test]
    fn test_run_emits_checkpoints_and_final() {
        let config = ModelConfig {
            cycles: 100,
            checkpoints: [0, 50, 99, 100, 200].into_iter().collect(),
            ..small_config()
        };
        let sim = Simulation::new(config).unwrap();
        let initial = sim.grid().clone();
        let mut recorder = SnapshotRecorder::new();

        let result = sim.run(&mut recorder).unwrap();

        let cycles: Vec<(u64, SnapshotKind)> = recorder
            .snapshots()
            .iter()
            .map(|s| (s.cycle, s.kind))
            .collect();
        assert_eq!(
            cycles,
            vec![
                (0, SnapshotKind::Checkpoint),
                (50, SnapshotKind::Checkpoint),
                (99, SnapshotKind::Checkpoint),
                (100, SnapshotKind::Final),
            ]
        );
        assert_eq!(recorder.snapshots()[0].grid, initial);
        assert_eq!(recorder.snapshots()[3], result.snapshot);
        assert_eq!(result.cycles_run, 100);
        assert!(result.convergences <= result.interactions);
    }

    #[test]
    fn test_values_stay_in_range() {
        let config = ModelConfig {
            grid_size: 6,
            features: 4,
            feature_range: 3,
            cycles: 5_000,
            seed: 99,
            ..Default::default()
        };
        let result = Simulation::new(config)
            .unwrap()
            .run(&mut SnapshotRecorder::new())
            .unwrap();
        assert!(result.grid().max_value().unwrap() < 3);
    }

    #[test]
    fn test_run_rejects_stepped_simulation() {
        let config = ModelConfig {
            cycles: 5,
            checkpoints: [0].into_iter().collect(),
            ..small_config()
        };
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..3 {
            sim.step();
        }

        let mut recorder = SnapshotRecorder::new();
        let result = sim.run(&mut recorder);

        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert!(recorder.snapshots().is_empty());
    }

    #[test]
    fn test_fresh_run_labels_snapshots_by_cycle_index() {
        let config = ModelConfig {
            cycles: 5,
            checkpoints: [0, 4].into_iter().collect(),
            ..small_config()
        };
        let mut recorder = SnapshotRecorder::new();
        let result = Simulation::new(config).unwrap().run(&mut recorder).unwrap();

        let cycles: Vec<u64> = recorder.snapshots().iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, vec![0, 4, 5]);
        assert_eq!(result.cycles_run, 5);
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&mut self, _snapshot: &Snapshot) -> Result<()> {
            Err(Error::Render("display closed".to_string()))
        }
    }

    #[test]
    fn test_renderer_error_aborts_run() {
        let config = ModelConfig {
            checkpoints: [3].into_iter().collect(),
            ..small_config()
        };
        let result = Simulation::new(config).unwrap().run(&mut FailingRenderer);
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
