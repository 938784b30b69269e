//! The foundation snapshot: per-tile tectonic and dynamics tensors, built once per run and immutable afterwards.
//!
//! An upstream simulation fills a [`WorldModel`]; [`FoundationContext::new`] validates it and freezes the tensors.
//! Once attached to a [`MapContext`](crate::MapContext) the snapshot is shared behind an [`Arc`](std::sync::Arc) and
//! only ever handed out by shared reference.

use glam::IVec2;

use crate::{
    error::{MapGenError, Result},
    grid::{Dimensions, OffsetCoordinate},
    map_parameters::FoundationConfig,
};

/// Output of the tectonics/dynamics simulation, before validation.
///
/// Every tensor is optional so that an incomplete model can be reported by name instead of failing somewhere
/// downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldModel {
    pub enabled: bool,
    pub plate_id: Option<Vec<i16>>,
    pub boundary_closeness: Option<Vec<u8>>,
    pub boundary_type: Option<Vec<u8>>,
    pub tectonic_stress: Option<Vec<u8>>,
    pub uplift_potential: Option<Vec<u8>>,
    pub rift_potential: Option<Vec<u8>>,
    pub shield_stability: Option<Vec<u8>>,
    pub plate_movement_u: Option<Vec<i8>>,
    pub plate_movement_v: Option<Vec<i8>>,
    pub plate_rotation: Option<Vec<i8>>,
    pub wind_u: Option<Vec<i8>>,
    pub wind_v: Option<Vec<i8>>,
    pub current_u: Option<Vec<i8>>,
    pub current_v: Option<Vec<i8>>,
    pub pressure: Option<Vec<u8>>,
    /// Seed bookkeeping of the plate generator, passed through unchanged.
    pub plate_seed: Option<serde_json::Value>,
    pub boundary_index: Option<BoundaryIndex>,
}

impl WorldModel {
    /// An enabled model whose tensors are all zero-filled with `size` entries.
    pub fn zeroed(size: usize) -> Self {
        Self {
            enabled: true,
            plate_id: Some(vec![0; size]),
            boundary_closeness: Some(vec![0; size]),
            boundary_type: Some(vec![0; size]),
            tectonic_stress: Some(vec![0; size]),
            uplift_potential: Some(vec![0; size]),
            rift_potential: Some(vec![0; size]),
            shield_stability: Some(vec![0; size]),
            plate_movement_u: Some(vec![0; size]),
            plate_movement_v: Some(vec![0; size]),
            plate_rotation: Some(vec![0; size]),
            wind_u: Some(vec![0; size]),
            wind_v: Some(vec![0; size]),
            current_u: Some(vec![0; size]),
            current_v: Some(vec![0; size]),
            pressure: Some(vec![0; size]),
            plate_seed: None,
            boundary_index: None,
        }
    }
}

pub struct FoundationOptions {
    pub dimensions: Dimensions,
    pub config: FoundationConfig,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct FoundationPlates {
    pub id: Box<[i16]>,
    pub boundary_closeness: Box<[u8]>,
    pub boundary_type: Box<[u8]>,
    pub tectonic_stress: Box<[u8]>,
    pub uplift_potential: Box<[u8]>,
    pub rift_potential: Box<[u8]>,
    pub shield_stability: Box<[u8]>,
    pub movement_u: Box<[i8]>,
    pub movement_v: Box<[i8]>,
    pub rotation: Box<[i8]>,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct FoundationDynamics {
    pub wind_u: Box<[i8]>,
    pub wind_v: Box<[i8]>,
    pub current_u: Box<[i8]>,
    pub current_v: Box<[i8]>,
    pub pressure: Box<[u8]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct FoundationDiagnostics {
    pub boundary_index: Option<BoundaryIndex>,
}

/// Validated, immutable foundation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundationContext {
    dimensions: Dimensions,
    plate_seed: Option<serde_json::Value>,
    plates: FoundationPlates,
    dynamics: FoundationDynamics,
    diagnostics: FoundationDiagnostics,
    config: FoundationConfig,
}

impl FoundationContext {
    /// Validates `model` and freezes its tensors.
    ///
    /// # Errors
    ///
    /// - [`MapGenError::WorldModelDisabled`] if the model is not enabled.
    /// - [`MapGenError::MissingTensor`] naming the first absent tensor.
    /// - [`MapGenError::TensorLengthMismatch`] naming the first tensor whose length is not `width * height`.
    pub fn new(model: WorldModel, options: FoundationOptions) -> Result<Self> {
        if !model.enabled {
            return Err(MapGenError::WorldModelDisabled);
        }
        let dimensions = options.dimensions;
        let size = dimensions.size();

        let plates = FoundationPlates {
            id: ensure_tensor("plateId", model.plate_id, size)?,
            boundary_closeness: ensure_tensor("boundaryCloseness", model.boundary_closeness, size)?,
            boundary_type: ensure_tensor("boundaryType", model.boundary_type, size)?,
            tectonic_stress: ensure_tensor("tectonicStress", model.tectonic_stress, size)?,
            uplift_potential: ensure_tensor("upliftPotential", model.uplift_potential, size)?,
            rift_potential: ensure_tensor("riftPotential", model.rift_potential, size)?,
            shield_stability: ensure_tensor("shieldStability", model.shield_stability, size)?,
            movement_u: ensure_tensor("plateMovementU", model.plate_movement_u, size)?,
            movement_v: ensure_tensor("plateMovementV", model.plate_movement_v, size)?,
            rotation: ensure_tensor("plateRotation", model.plate_rotation, size)?,
        };
        let dynamics = FoundationDynamics {
            wind_u: ensure_tensor("windU", model.wind_u, size)?,
            wind_v: ensure_tensor("windV", model.wind_v, size)?,
            current_u: ensure_tensor("currentU", model.current_u, size)?,
            current_v: ensure_tensor("currentV", model.current_v, size)?,
            pressure: ensure_tensor("pressure", model.pressure, size)?,
        };

        tracing::debug!(
            target: "mapgen::foundation",
            width = dimensions.width(),
            height = dimensions.height(),
            boundary_index = model.boundary_index.is_some(),
            "foundation.created"
        );

        Ok(Self {
            dimensions,
            plate_seed: model.plate_seed,
            plates,
            dynamics,
            diagnostics: FoundationDiagnostics {
                boundary_index: model.boundary_index,
            },
            config: options.config,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn plate_seed(&self) -> Option<&serde_json::Value> {
        self.plate_seed.as_ref()
    }

    pub fn plates(&self) -> &FoundationPlates {
        &self.plates
    }

    pub fn dynamics(&self) -> &FoundationDynamics {
        &self.dynamics
    }

    pub fn diagnostics(&self) -> &FoundationDiagnostics {
        &self.diagnostics
    }

    /// The configuration that produced the tensors.
    pub fn config(&self) -> &FoundationConfig {
        &self.config
    }
}

fn ensure_tensor<T>(name: &'static str, tensor: Option<Vec<T>>, size: usize) -> Result<Box<[T]>> {
    let tensor = tensor.ok_or(MapGenError::MissingTensor { name })?;
    if tensor.len() != size {
        return Err(MapGenError::TensorLengthMismatch {
            name,
            expected: size,
            received: tensor.len(),
        });
    }
    Ok(tensor.into_boxed_slice())
}

/// Bucketed spatial index over plate-boundary tiles.
///
/// The grid is divided into square buckets of `bucket_size` tiles; each bucket lists the boundary tiles it contains.
/// [`BoundaryIndex::nearest`] searches outward ring by ring and stops as soon as no farther bucket can hold a closer
/// tile, so the answer is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryIndex {
    bucket_size: i32,
    buckets_x: i32,
    buckets_y: i32,
    buckets: Vec<Vec<OffsetCoordinate>>,
    len: usize,
}

impl BoundaryIndex {
    /// Indexes every tile whose boundary closeness is at least `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::TensorLengthMismatch`] if `closeness` does not hold `width * height` entries.
    pub fn from_closeness(
        dimensions: Dimensions,
        closeness: &[u8],
        threshold: u8,
        bucket_size: u32,
    ) -> Result<Self> {
        if closeness.len() != dimensions.size() {
            return Err(MapGenError::TensorLengthMismatch {
                name: "boundaryCloseness",
                expected: dimensions.size(),
                received: closeness.len(),
            });
        }
        let tiles = dimensions
            .all_coordinates()
            .zip(closeness)
            .filter(|&(_, &value)| value >= threshold)
            .map(|(tile, _)| tile);
        Ok(Self::build(dimensions, tiles, bucket_size))
    }

    pub fn build(
        dimensions: Dimensions,
        tiles: impl IntoIterator<Item = OffsetCoordinate>,
        bucket_size: u32,
    ) -> Self {
        let bucket_size = bucket_size.max(1) as i32;
        let buckets_x = (dimensions.width() as i32 + bucket_size - 1) / bucket_size;
        let buckets_y = (dimensions.height() as i32 + bucket_size - 1) / bucket_size;
        let mut buckets = vec![Vec::new(); (buckets_x * buckets_y) as usize];
        let mut len = 0;

        for tile in tiles {
            if !dimensions.in_bounds(tile.x(), tile.y()) {
                continue;
            }
            let bucket = (tile.y() / bucket_size) * buckets_x + tile.x() / bucket_size;
            buckets[bucket as usize].push(tile);
            len += 1;
        }

        Self {
            bucket_size,
            buckets_x,
            buckets_y,
            buckets,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The indexed tile closest to `(x, y)` by Euclidean distance, or `None` if the index is empty.
    ///
    /// Ties resolve to the tile found first, scanning buckets row by row within each ring.
    pub fn nearest(&self, x: i32, y: i32) -> Option<OffsetCoordinate> {
        if self.is_empty() {
            return None;
        }
        let query = IVec2::new(x, y);
        let center_x = (x / self.bucket_size).clamp(0, self.buckets_x - 1);
        let center_y = (y / self.bucket_size).clamp(0, self.buckets_y - 1);
        let max_ring = self.buckets_x.max(self.buckets_y);

        let mut best: Option<(i32, OffsetCoordinate)> = None;
        for ring in 0..=max_ring {
            for bucket_y in center_y - ring..=center_y + ring {
                for bucket_x in center_x - ring..=center_x + ring {
                    let on_ring = (bucket_x - center_x).abs() == ring || (bucket_y - center_y).abs() == ring;
                    if !on_ring
                        || !(0..self.buckets_x).contains(&bucket_x)
                        || !(0..self.buckets_y).contains(&bucket_y)
                    {
                        continue;
                    }
                    let bucket = &self.buckets[(bucket_y * self.buckets_x + bucket_x) as usize];
                    for &tile in bucket {
                        let distance = (tile.into_inner() - query).length_squared();
                        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                            best = Some((distance, tile));
                        }
                    }
                }
            }
            // Tiles beyond this ring are at least `ring * bucket_size` away.
            let reach = ring * self.bucket_size;
            if best.is_some_and(|(distance, _)| distance <= reach * reach) {
                break;
            }
        }

        best.map(|(_, tile)| tile)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryIndex, FoundationContext, FoundationOptions, WorldModel};
    use crate::{
        error::MapGenError,
        grid::{Dimensions, OffsetCoordinate},
        map_parameters::FoundationConfig,
    };

    fn options(width: u32, height: u32) -> FoundationOptions {
        FoundationOptions {
            dimensions: Dimensions::new(width, height).unwrap(),
            config: FoundationConfig::default(),
        }
    }

    #[test]
    fn plate_id_of_wrong_length_fails() {
        let mut model = WorldModel::zeroed(60);
        model.plate_id = Some(vec![0; 59]);
        let error = FoundationContext::new(model, options(10, 6)).unwrap_err();
        assert!(matches!(
            error,
            MapGenError::TensorLengthMismatch {
                name: "plateId",
                expected: 60,
                received: 59
            }
        ));
    }

    #[test]
    fn missing_tensor_is_named() {
        let mut model = WorldModel::zeroed(60);
        model.current_v = None;
        let error = FoundationContext::new(model, options(10, 6)).unwrap_err();
        assert!(matches!(error, MapGenError::MissingTensor { name: "currentV" }));
        assert_eq!(error.to_string(), "missing currentV tensor");
    }

    #[test]
    fn disabled_model_fails() {
        let model = WorldModel {
            enabled: false,
            ..WorldModel::zeroed(60)
        };
        assert!(matches!(
            FoundationContext::new(model, options(10, 6)),
            Err(MapGenError::WorldModelDisabled)
        ));
    }

    #[test]
    fn valid_model_is_frozen_with_config() {
        let mut config = FoundationConfig::default();
        config.dynamics.directionality.cohesion = 0.4;
        let foundation = FoundationContext::new(
            WorldModel::zeroed(60),
            FoundationOptions {
                dimensions: Dimensions::new(10, 6).unwrap(),
                config,
            },
        )
        .unwrap();
        assert_eq!(foundation.plates().id.len(), 60);
        assert_eq!(foundation.dynamics().pressure.len(), 60);
        assert_eq!(foundation.config().dynamics.directionality.cohesion, 0.4);
        assert!(foundation.diagnostics().boundary_index.is_none());
    }

    #[test]
    fn boundary_index_finds_exact_nearest() {
        let dimensions = Dimensions::new(20, 12).unwrap();
        let tiles = [
            OffsetCoordinate::new(1, 1),
            OffsetCoordinate::new(9, 5),
            OffsetCoordinate::new(18, 11),
        ];
        let index = BoundaryIndex::build(dimensions, tiles, 4);
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(8, 8), Some(OffsetCoordinate::new(9, 5)));
        assert_eq!(index.nearest(0, 3), Some(OffsetCoordinate::new(1, 1)));
        assert_eq!(index.nearest(19, 0), Some(OffsetCoordinate::new(18, 11)));
        for y in 0..12 {
            for x in 0..20 {
                let brute = tiles
                    .iter()
                    .min_by_key(|tile| (tile.x() - x).pow(2) + (tile.y() - y).pow(2))
                    .copied();
                let found = index.nearest(x, y).unwrap();
                let distance = |tile: OffsetCoordinate| (tile.x() - x).pow(2) + (tile.y() - y).pow(2);
                assert_eq!(distance(found), distance(brute.unwrap()), "({x}, {y})");
            }
        }
    }

    #[test]
    fn boundary_index_from_closeness_uses_threshold() {
        let dimensions = Dimensions::new(4, 2).unwrap();
        let closeness = [0, 200, 0, 0, 0, 0, 90, 255];
        let index = BoundaryIndex::from_closeness(dimensions, &closeness, 128, 2).unwrap();
        assert_eq!(index.len(), 2);
        assert!(BoundaryIndex::from_closeness(dimensions, &closeness[..7], 128, 2).is_err());
        assert!(BoundaryIndex::build(dimensions, [], 2).nearest(0, 0).is_none());
    }
}
