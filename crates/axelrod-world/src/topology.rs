//! Von Neumann neighborhood on a bounded square grid.

use axelrod_core::Site;

/// Neighbors of `site` on an `n x n` grid, clipped at the boundary.
///
/// Order is left, right, up, down, skipping any that fall outside the grid.
/// `site` must lie inside the grid.
pub fn neighbors(n: usize, site: Site) -> Vec<Site> {
    debug_assert!(site.in_grid(n), "site {} outside a grid of size {}", site, n);

    let Site { x, y } = site;
    let mut neighbors = Vec::with_capacity(4);

    if x > 0 {
        neighbors.push(Site::new(x - 1, y));
    }
    if x + 1 < n {
        neighbors.push(Site::new(x + 1, y));
    }
    if y > 0 {
        neighbors.push(Site::new(x, y - 1));
    }
    if y + 1 < n {
        neighbors.push(Site::new(x, y + 1));
    }

    neighbors
}
