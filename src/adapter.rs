//! The terrain authority boundary.
//!
//! [`EngineAdapter`] is the only channel through which the core reads from or writes to the authoritative tile grid,
//! and the only source of randomness. [`MockAdapter`] is an in-memory implementation for tests and offline tooling.

use std::ops::Range;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::grid::{Dimensions, OffsetCoordinate};

/// Feature placement request passed to [`EngineAdapter::set_feature_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureData {
    pub feature: i16,
}

/// Queries and mutations offered by the host terrain grid.
///
/// Scalar reads return `None` when the authority has no value for the tile (typically because the tile is out of
/// bounds). Predicates answer `false` in that case.
pub trait EngineAdapter {
    fn is_water(&self, x: i32, y: i32) -> bool;

    /// Returns `true` if a river runs within the square window of `radius` around `(x, y)`.
    fn is_adjacent_to_rivers(&self, x: i32, y: i32, radius: u32) -> bool;

    /// Land tile with at least one water tile among its 8 neighbours.
    fn is_coastal_land(&self, x: i32, y: i32) -> bool;

    /// Returns `true` if one of the 8 neighbours is shallow (coast) water.
    fn is_adjacent_to_shallow_water(&self, x: i32, y: i32) -> bool;

    fn get_elevation(&self, x: i32, y: i32) -> Option<i32>;

    fn get_rainfall(&self, x: i32, y: i32) -> Option<i32>;

    fn get_terrain_type(&self, x: i32, y: i32) -> Option<u8>;

    /// Latitude in degrees, `90` at the top row and `-90` at the bottom.
    fn get_latitude(&self, x: i32, y: i32) -> f64;

    fn set_terrain_type(&mut self, x: i32, y: i32, terrain_type: u8);

    fn set_rainfall(&mut self, x: i32, y: i32, rainfall: i32);

    fn set_elevation(&mut self, x: i32, y: i32, elevation: i32);

    fn get_feature_type(&self, x: i32, y: i32) -> Option<i16>;

    fn set_feature_type(&mut self, x: i32, y: i32, feature_data: FeatureData);

    fn can_have_feature(&self, x: i32, y: i32, feature_type: i16) -> bool;

    /// Returns an integer in `[0, max)`. `label` identifies the call site for replay.
    fn random_int(&mut self, max: u32, label: &str) -> u32;
}

/// Terrain ids used by [`MockAdapter`].
pub mod terrain_id {
    pub const MOUNTAIN: u8 = 0;
    pub const HILL: u8 = 1;
    pub const FLAT: u8 = 2;
    pub const COAST: u8 = 3;
    pub const OCEAN: u8 = 4;
}

/// Feature id meaning "no feature".
pub const NO_FEATURE: i16 = -1;

/// An in-memory terrain authority.
///
/// Every tile starts as flat land at elevation `100` with rainfall `50`. Water is any tile whose terrain is
/// [`terrain_id::COAST`] or [`terrain_id::OCEAN`].
#[derive(Debug, Clone)]
pub struct MockAdapter {
    dimensions: Dimensions,
    terrain_types: Vec<u8>,
    elevations: Vec<i16>,
    rainfall: Vec<u8>,
    features: Vec<i16>,
    river_mask: Vec<bool>,
    random_number_generator: StdRng,
    /// Labels passed to [`EngineAdapter::random_int`], in call order.
    random_labels: Vec<String>,
}

impl MockAdapter {
    pub fn new(dimensions: Dimensions, seed: u64) -> Self {
        let size = dimensions.size();
        Self {
            dimensions,
            terrain_types: vec![terrain_id::FLAT; size],
            elevations: vec![100; size],
            rainfall: vec![50; size],
            features: vec![NO_FEATURE; size],
            river_mask: vec![false; size],
            random_number_generator: StdRng::seed_from_u64(seed),
            random_labels: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Turns every tile into deep ocean.
    pub fn with_ocean(mut self) -> Self {
        self.terrain_types.fill(terrain_id::OCEAN);
        self
    }

    /// Sets the terrain of the rectangle `x × y` (clipped to the grid).
    pub fn with_terrain(mut self, x: Range<i32>, y: Range<i32>, terrain_type: u8) -> Self {
        for index in self.rect_indices(x, y) {
            self.terrain_types[index] = terrain_type;
        }
        self
    }

    pub fn with_water(self, x: Range<i32>, y: Range<i32>) -> Self {
        self.with_terrain(x, y, terrain_id::OCEAN)
    }

    pub fn with_land(self, x: Range<i32>, y: Range<i32>) -> Self {
        self.with_terrain(x, y, terrain_id::FLAT)
    }

    /// Marks the given tiles as carrying a river.
    pub fn with_rivers(mut self, tiles: impl IntoIterator<Item = OffsetCoordinate>) -> Self {
        for tile in tiles {
            if let Some(index) = self.dimensions.index(tile.x(), tile.y()) {
                self.river_mask[index] = true;
            }
        }
        self
    }

    /// Sets every tile's elevation from `elevation(x, y)`.
    pub fn with_elevation(mut self, elevation: impl Fn(i32, i32) -> i32) -> Self {
        for (index, coordinate) in self.dimensions.all_coordinates().enumerate() {
            self.elevations[index] = clamp_i16(elevation(coordinate.x(), coordinate.y()));
        }
        self
    }

    /// Sets every tile's rainfall from `rainfall(x, y)`, clamped to `0..=200`.
    pub fn with_rainfall(mut self, rainfall: impl Fn(i32, i32) -> i32) -> Self {
        for (index, coordinate) in self.dimensions.all_coordinates().enumerate() {
            self.rainfall[index] = rainfall(coordinate.x(), coordinate.y()).clamp(0, 200) as u8;
        }
        self
    }

    pub fn random_labels(&self) -> &[String] {
        &self.random_labels
    }

    fn rect_indices(&self, x: Range<i32>, y: Range<i32>) -> Vec<usize> {
        let dimensions = self.dimensions;
        y.flat_map(|y| x.clone().map(move |x| (x, y)))
            .filter_map(|(x, y)| dimensions.index(x, y))
            .collect()
    }

    fn terrain_at(&self, x: i32, y: i32) -> Option<u8> {
        self.dimensions
            .index(x, y)
            .map(|index| self.terrain_types[index])
    }

    fn neighbors(&self, x: i32, y: i32) -> impl Iterator<Item = OffsetCoordinate> + use<> {
        self.dimensions
            .neighbors8(OffsetCoordinate::new(x, y))
            .into_iter()
    }
}

impl EngineAdapter for MockAdapter {
    fn is_water(&self, x: i32, y: i32) -> bool {
        matches!(
            self.terrain_at(x, y),
            Some(terrain_id::COAST | terrain_id::OCEAN)
        )
    }

    fn is_adjacent_to_rivers(&self, x: i32, y: i32, radius: u32) -> bool {
        self.dimensions
            .tiles_in_window(OffsetCoordinate::new(x, y), radius)
            .filter_map(|tile| self.dimensions.index(tile.x(), tile.y()))
            .any(|index| self.river_mask[index])
    }

    fn is_coastal_land(&self, x: i32, y: i32) -> bool {
        self.dimensions.in_bounds(x, y)
            && !self.is_water(x, y)
            && self
                .neighbors(x, y)
                .any(|neighbor| self.is_water(neighbor.x(), neighbor.y()))
    }

    fn is_adjacent_to_shallow_water(&self, x: i32, y: i32) -> bool {
        self.neighbors(x, y)
            .any(|neighbor| self.terrain_at(neighbor.x(), neighbor.y()) == Some(terrain_id::COAST))
    }

    fn get_elevation(&self, x: i32, y: i32) -> Option<i32> {
        self.dimensions
            .index(x, y)
            .map(|index| self.elevations[index] as i32)
    }

    fn get_rainfall(&self, x: i32, y: i32) -> Option<i32> {
        self.dimensions
            .index(x, y)
            .map(|index| self.rainfall[index] as i32)
    }

    fn get_terrain_type(&self, x: i32, y: i32) -> Option<u8> {
        self.terrain_at(x, y)
    }

    fn get_latitude(&self, _x: i32, y: i32) -> f64 {
        90.0 - (y as f64 / self.dimensions.height() as f64) * 180.0
    }

    fn set_terrain_type(&mut self, x: i32, y: i32, terrain_type: u8) {
        if let Some(index) = self.dimensions.index(x, y) {
            self.terrain_types[index] = terrain_type;
        }
    }

    fn set_rainfall(&mut self, x: i32, y: i32, rainfall: i32) {
        if let Some(index) = self.dimensions.index(x, y) {
            self.rainfall[index] = rainfall.clamp(0, 200) as u8;
        }
    }

    fn set_elevation(&mut self, x: i32, y: i32, elevation: i32) {
        if let Some(index) = self.dimensions.index(x, y) {
            self.elevations[index] = clamp_i16(elevation);
        }
    }

    fn get_feature_type(&self, x: i32, y: i32) -> Option<i16> {
        self.dimensions
            .index(x, y)
            .map(|index| self.features[index])
    }

    fn set_feature_type(&mut self, x: i32, y: i32, feature_data: FeatureData) {
        if let Some(index) = self.dimensions.index(x, y) {
            self.features[index] = feature_data.feature;
        }
    }

    fn can_have_feature(&self, x: i32, y: i32, _feature_type: i16) -> bool {
        self.dimensions.in_bounds(x, y)
    }

    fn random_int(&mut self, max: u32, label: &str) -> u32 {
        self.random_labels.push(label.to_owned());
        if max <= 1 {
            return 0;
        }
        self.random_number_generator.random_range(0..max)
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::{EngineAdapter, FeatureData, MockAdapter, NO_FEATURE, terrain_id};
    use crate::grid::{Dimensions, OffsetCoordinate};

    fn adapter() -> MockAdapter {
        MockAdapter::new(Dimensions::new(6, 4).unwrap(), 7)
    }

    #[test]
    fn coastal_land_borders_water() {
        let adapter = adapter().with_water(0..2, 0..4);
        assert!(adapter.is_coastal_land(2, 1));
        assert!(!adapter.is_coastal_land(4, 1));
        assert!(!adapter.is_coastal_land(1, 1));
    }

    #[test]
    fn shallow_water_is_coast_terrain_only() {
        let adapter = adapter()
            .with_water(0..1, 0..4)
            .with_terrain(5..6, 0..4, terrain_id::COAST);
        assert!(!adapter.is_adjacent_to_shallow_water(1, 1));
        assert!(adapter.is_adjacent_to_shallow_water(4, 1));
    }

    #[test]
    fn river_adjacency_respects_radius() {
        let adapter = adapter().with_rivers([OffsetCoordinate::new(0, 0)]);
        assert!(adapter.is_adjacent_to_rivers(1, 1, 1));
        assert!(!adapter.is_adjacent_to_rivers(2, 2, 1));
        assert!(adapter.is_adjacent_to_rivers(2, 2, 2));
    }

    #[test]
    fn out_of_bounds_reads_have_no_data() {
        let adapter = adapter();
        assert_eq!(adapter.get_elevation(-1, 0), None);
        assert_eq!(adapter.get_terrain_type(6, 0), None);
        assert!(!adapter.is_water(0, 4));
    }

    #[test]
    fn same_seed_gives_same_draws() {
        let mut first = adapter();
        let mut second = adapter();
        let a: Vec<_> = (0..16).map(|_| first.random_int(10, "draw")).collect();
        let b: Vec<_> = (0..16).map(|_| second.random_int(10, "draw")).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|&value| value < 10));
        assert_eq!(first.random_labels().len(), 16);
    }

    #[test]
    fn feature_writes_stay_in_bounds() {
        let mut adapter = adapter();
        assert_eq!(adapter.get_feature_type(3, 2), Some(NO_FEATURE));
        adapter.set_feature_type(3, 2, FeatureData { feature: 7 });
        adapter.set_feature_type(9, 9, FeatureData { feature: 7 });
        assert_eq!(adapter.get_feature_type(3, 2), Some(7));
        assert_eq!(adapter.get_feature_type(9, 9), None);
        assert!(!adapter.can_have_feature(9, 9, 7));
    }

    #[test]
    fn rainfall_writes_are_clamped() {
        let mut adapter = adapter();
        adapter.set_rainfall(0, 0, 500);
        assert_eq!(adapter.get_rainfall(0, 0), Some(200));
    }
}
