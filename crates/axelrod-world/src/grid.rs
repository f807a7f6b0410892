//! Square grid of cultures with flat, contiguous storage.

use crate::random::RandomSource;
use axelrod_core::{differing_features, similarity, Error, FeatureValue, ModelConfig, Result, Site};
use serde::{Deserialize, Serialize};

/// An `n x n` grid where every site holds a culture of `features` values.
///
/// Cultures are stored back to back in one vector; the culture at `(x, y)`
/// starts at offset `(y * n + x) * features`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    features: usize,
    cells: Vec<FeatureValue>,
}

impl Grid {
    /// Grid with every feature set to zero
    pub fn new(size: usize, features: usize) -> Self {
        Self {
            size,
            features,
            cells: vec![0; size * size * features],
        }
    }

    /// Grid with every feature drawn uniformly from `[0, feature_range)`.
    /// Cultures are filled in row-major site order, features in order.
    /// `config` must already be validated.
    pub(crate) fn random(config: &ModelConfig, rng: &mut impl RandomSource) -> Self {
        let mut grid = Self::new(config.grid_size, config.features);
        let range = config.feature_range as usize;

        for value in &mut grid.cells {
            *value = rng.index(range) as FeatureValue;
        }

        grid
    }

    /// Build a grid from explicit cultures listed in row-major order
    pub fn from_cultures(size: usize, cultures: Vec<Vec<FeatureValue>>) -> Result<Self> {
        if cultures.len() != size * size {
            return Err(Error::InvalidConfig(format!(
                "expected {} cultures for a grid of size {}, got {}",
                size * size,
                size,
                cultures.len()
            )));
        }

        let features = cultures.first().map_or(0, Vec::len);
        if cultures.iter().any(|culture| culture.len() != features) {
            return Err(Error::InvalidConfig(
                "all cultures must have the same number of features".to_string(),
            ));
        }

        Ok(Self {
            size,
            features,
            cells: cultures.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn features(&self) -> usize {
        self.features
    }

    pub fn num_sites(&self) -> usize {
        self.size * self.size
    }

    pub fn contains(&self, site: Site) -> bool {
        site.in_grid(self.size)
    }

    /// Culture at `site`.
    ///
    /// # Panics
    /// If `site` is outside the grid.
    pub fn culture(&self, site: Site) -> &[FeatureValue] {
        let offset = self.offset(site);
        &self.cells[offset..offset + self.features]
    }

    /// Checked form of [`Grid::culture`]
    pub fn try_culture(&self, site: Site) -> Result<&[FeatureValue]> {
        if !self.contains(site) {
            return Err(Error::OutOfBounds {
                x: site.x,
                y: site.y,
                size: self.size,
            });
        }
        Ok(self.culture(site))
    }

    /// Similarity between the cultures at two sites
    pub fn similarity(&self, a: Site, b: Site) -> f64 {
        similarity(self.culture(a), self.culture(b))
    }

    /// Feature positions where the cultures at two sites differ
    pub fn differing_features(&self, a: Site, b: Site) -> Vec<usize> {
        differing_features(self.culture(a), self.culture(b))
    }

    /// Copy feature `feature` of the culture at `from` onto the culture at `to`
    pub(crate) fn copy_feature(&mut self, to: Site, from: Site, feature: usize) {
        debug_assert!(feature < self.features);
        let value = self.cells[self.offset(from) + feature];
        let target = self.offset(to) + feature;
        self.cells[target] = value;
    }

    /// Largest feature value present, if the grid holds any values
    pub fn max_value(&self) -> Option<FeatureValue> {
        self.cells.iter().copied().max()
    }

    /// Iterator over all sites in row-major order
    pub fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        (0..self.num_sites()).map(move |i| self.index_to_site(i))
    }

    /// Iterator over all sites with their cultures
    pub fn iter(&self) -> impl Iterator<Item = (Site, &[FeatureValue])> + '_ {
        self.sites().map(move |site| (site, self.culture(site)))
    }

    /// Row-major index of a site
    pub fn site_index(&self, site: Site) -> usize {
        assert!(
            self.contains(site),
            "site {} outside a grid of size {}",
            site,
            self.size
        );
        site.y * self.size + site.x
    }

    /// Site at a row-major index
    pub fn index_to_site(&self, index: usize) -> Site {
        Site::new(index % self.size, index / self.size)
    }

    fn offset(&self, site: Site) -> usize {
        self.site_index(site) * self.features
    }
}
