//! Axelrod model simulation engine.
//!
//! A square grid of agents, each holding a vector of discrete culture
//! features, evolves through random pairwise interactions between von
//! Neumann neighbors. Similar neighbors interact more often and each
//! interaction makes them more similar.

pub mod grid;
pub mod random;
pub mod simulation;
pub mod snapshot;
pub mod stats;
pub mod topology;

pub use grid::Grid;
pub use random::RandomSource;
pub use simulation::{Simulation, SimulationResult};
pub use snapshot::{Edge, Renderer, Snapshot, SnapshotKind, SnapshotRecorder, TracingRenderer};
pub use stats::GridStats;
pub use topology::neighbors;
