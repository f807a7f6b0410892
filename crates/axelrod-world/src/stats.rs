//! Whole-grid measures of cultural structure.

use crate::grid::Grid;
use crate::topology::neighbors;
use axelrod_core::{FeatureValue, Site};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Summary of the cultural structure of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Connected areas of identical culture
    pub regions: usize,
    /// Number of distinct cultures anywhere on the grid
    pub distinct_cultures: usize,
    /// Mean similarity across all adjacent pairs
    pub mean_similarity: f64,
    /// No adjacent pair can interact and change anything
    pub frozen: bool,
}

impl GridStats {
    pub fn of(grid: &Grid) -> Self {
        Self {
            regions: count_regions(grid),
            distinct_cultures: count_distinct_cultures(grid),
            mean_similarity: mean_similarity(grid),
            frozen: is_frozen(grid),
        }
    }
}

/// Number of connected regions whose sites all share one culture
pub fn count_regions(grid: &Grid) -> usize {
    let mut visited = vec![false; grid.num_sites()];
    let mut queue = VecDeque::new();
    let mut regions = 0;

    for start in grid.sites() {
        let start_index = grid.site_index(start);
        if visited[start_index] {
            continue;
        }

        regions += 1;
        visited[start_index] = true;
        queue.push_back(start);

        while let Some(site) = queue.pop_front() {
            for neighbor in neighbors(grid.size(), site) {
                let index = grid.site_index(neighbor);
                if !visited[index] && grid.culture(neighbor) == grid.culture(site) {
                    visited[index] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    regions
}

/// Number of distinct cultures on the grid
pub fn count_distinct_cultures(grid: &Grid) -> usize {
    let mut cultures: Vec<&[FeatureValue]> = grid.iter().map(|(_, culture)| culture).collect();
    cultures.sort_unstable();
    cultures.dedup();
    cultures.len()
}

/// Mean similarity over every adjacent pair; 1.0 when there are no pairs
pub fn mean_similarity(grid: &Grid) -> f64 {
    let (total, pairs) = adjacent_pairs(grid)
        .map(|(a, b)| grid.similarity(a, b))
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));

    if pairs == 0 {
        1.0
    } else {
        total / pairs as f64
    }
}

/// Whether the grid has reached a state where no cycle can change it.
///
/// Adjacent cultures that are identical have nothing to converge and
/// cultures with nothing in common interact only with probability zero.
pub fn is_frozen(grid: &Grid) -> bool {
    adjacent_pairs(grid).all(|(a, b)| {
        let s = grid.similarity(a, b);
        s == 0.0 || s == 1.0
    })
}

/// Each unordered pair of adjacent sites, once
pub(crate) fn adjacent_pairs(
    grid: &Grid,
) -> impl Iterator<Item = (Site, Site)> + '_ {
    grid.sites().flat_map(move |site| {
        neighbors(grid.size(), site)
            .into_iter()
            .filter(move |neighbor| grid.site_index(*neighbor) > grid.site_index(site))
            .map(move |neighbor| (site, neighbor))
    })
}
