//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single feature value. Always lies in `[0, feature_range)`.
pub type FeatureValue = u32;

/// Grid coordinate identifying one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Site {
    pub x: usize,
    pub y: usize,
}

impl Site {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Whether the site lies inside an `n x n` grid
    pub fn in_grid(&self, n: usize) -> bool {
        self.x < n && self.y < n
    }

    /// Manhattan distance to another site
    pub fn manhattan_distance(&self, other: &Site) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(usize, usize)> for Site {
    fn from((x, y): (usize, usize)) -> Self {
        Self::new(x, y)
    }
}

/// Fraction of feature positions at which two cultures agree.
///
/// This is the one definition of similarity: it drives interaction
/// probability and is what renderers use for edge intensity. Two empty
/// cultures are considered identical.
pub fn similarity(a: &[FeatureValue], b: &[FeatureValue]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "cultures must have equal length");
    if a.is_empty() {
        return 1.0;
    }
    let matching = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matching as f64 / a.len() as f64
}

/// Positions at which two cultures hold different values, in ascending order
pub fn differing_features(a: &[FeatureValue], b: &[FeatureValue]) -> Vec<usize> {
    a.iter()
        .zip(b)
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(i, _)| i)
        .collect()
}
