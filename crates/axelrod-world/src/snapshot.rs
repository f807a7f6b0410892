//! Read-only grid snapshots and the renderer boundary.

use crate::grid::Grid;
use crate::stats::{adjacent_pairs, GridStats};
use axelrod_core::{FeatureValue, Result, Site};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Why a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// Start of a configured checkpoint cycle
    Checkpoint,
    /// After the last cycle
    Final,
}

/// Owned copy of the grid handed to a renderer.
///
/// Mutating the simulation after a snapshot is taken never affects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub kind: SnapshotKind,
    pub feature_range: u32,
    pub grid: Grid,
}

/// Border between two adjacent sites
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: Site,
    pub b: Site,
    pub similarity: f64,
}

impl Snapshot {
    pub fn new(cycle: u64, kind: SnapshotKind, feature_range: u32, grid: Grid) -> Self {
        Self {
            cycle,
            kind,
            feature_range,
            grid,
        }
    }

    pub fn culture(&self, site: Site) -> &[FeatureValue] {
        self.grid.culture(site)
    }

    /// Every border between adjacent sites with the similarity across it
    pub fn edges(&self) -> Vec<Edge> {
        adjacent_pairs(&self.grid)
            .map(|(a, b)| Edge {
                a,
                b,
                similarity: self.grid.similarity(a, b),
            })
            .collect()
    }

    pub fn stats(&self) -> GridStats {
        GridStats::of(&self.grid)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Consumer of grid snapshots, typically a visualizer
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps every snapshot it receives
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    snapshots: Vec<Snapshot>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl Renderer for SnapshotRecorder {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// Logs a structural summary of each snapshot, or only counts them when
/// silent
#[derive(Debug)]
pub struct TracingRenderer {
    rendered: usize,
    log_snapshots: bool,
}

impl Default for TracingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self {
            rendered: 0,
            log_snapshots: true,
        }
    }

    pub fn silent() -> Self {
        Self {
            rendered: 0,
            log_snapshots: false,
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn logs_snapshots(&self) -> bool {
        self.log_snapshots
    }
}

impl Renderer for TracingRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.rendered += 1;
        if !self.log_snapshots {
            return Ok(());
        }

        let stats = snapshot.stats();

        info!(
            event = "snapshot",
            cycle = snapshot.cycle,
            kind = ?snapshot.kind,
            grid_size = snapshot.grid.size(),
            feature_range = snapshot.feature_range,
            regions = stats.regions,
            distinct_cultures = stats.distinct_cultures,
            mean_similarity = format!("{:.3}", stats.mean_similarity),
            frozen = stats.frozen,
            "Grid snapshot"
        );

        Ok(())
    }
}
