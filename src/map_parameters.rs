//! Configuration consumed by the map generation core.
//!
//! Every struct deserializes from camelCase JSON with all fields optional; missing fields take the defaults below.
//! The corridor tunables are plain data here. Clamping to the supported ranges happens in the `normalized` methods,
//! so a config can round-trip through JSON unchanged even when it holds out-of-range values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    story::{CorridorKind, CorridorStyle},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapGenConfig {
    /// Optional run seed, copied into [`RngState::seed`](crate::map_context::RngState) for replay bookkeeping.
    pub seed: Option<u64>,
    pub foundation: FoundationConfig,
    pub corridors: CorridorsConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl MapGenConfig {
    /// Parses a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Snapshot of the knobs that produced the foundation tensors.
///
/// `surface`, `policy` and `diagnostics` are forwarded opaquely: the core only stores them so downstream consumers can
/// see what the tectonics stage was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FoundationConfig {
    pub seed: SeedConfig,
    pub plates: PlatesConfig,
    pub dynamics: DynamicsConfig,
    pub surface: serde_json::Value,
    pub policy: serde_json::Value,
    pub diagnostics: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedMode {
    /// Use the terrain authority's RNG.
    #[default]
    Engine,
    /// Use `fixed_seed` for reproducible worlds.
    Fixed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeedConfig {
    pub mode: SeedMode,
    pub fixed_seed: Option<u64>,
    /// Offset added before deriving per-subsystem seeds.
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatesConfig {
    pub count: u32,
    pub relaxation_steps: u32,
    /// Ratio of convergent to divergent boundaries, `0..=1`.
    pub convergence_mix: f64,
    pub plate_rotation_multiple: f64,
}

impl Default for PlatesConfig {
    fn default() -> Self {
        Self {
            count: 8,
            relaxation_steps: 5,
            convergence_mix: 0.5,
            plate_rotation_multiple: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DynamicsConfig {
    pub mantle: MantleConfig,
    pub wind: WindConfig,
    pub directionality: DirectionalityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MantleConfig {
    pub bumps: u32,
    pub amplitude: f64,
    pub scale: f64,
}

impl Default for MantleConfig {
    fn default() -> Self {
        Self {
            bumps: 4,
            amplitude: 0.6,
            scale: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindConfig {
    pub jet_streaks: u32,
    pub jet_strength: f64,
    pub variance: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            jet_streaks: 3,
            jet_strength: 1.0,
            variance: 0.6,
        }
    }
}

/// Cross-system alignment between plates, winds and currents.
///
/// A `cohesion` of `0` (the default) disables every directionality adjustment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionalityConfig {
    pub cohesion: f64,
    pub primary_axes: PrimaryAxes,
    pub interplay: Interplay,
}

/// Preferred headings in degrees, `0°` pointing east.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrimaryAxes {
    pub plate_axis_deg: f64,
    pub wind_bias_deg: f64,
    pub current_bias_deg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interplay {
    /// How strongly prevailing winds rotate toward the plate axis, `0..=1`.
    pub winds_follow_plates: f64,
    /// How strongly ocean currents follow the winds, `0..=1`.
    pub currents_follow_winds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticsConfig {
    pub log_ascii: bool,
    pub log_histograms: bool,
    /// Directory that receives a PNG of the corridor mask after each corridor phase.
    pub dump_dir: Option<String>,
}

/// Strategic corridor tunables, one section per corridor family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorridorsConfig {
    pub sea: SeaLaneConfig,
    pub island_hop: IslandHopConfig,
    pub land: LandCorridorConfig,
    pub river: RiverChainConfig,
    /// Style primitives attached to tagged tiles, looked up as `kinds[kind].styles[style]`.
    pub kinds: BTreeMap<CorridorKind, CorridorKindConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorridorKindConfig {
    pub styles: BTreeMap<CorridorStyle, CorridorStyleConfig>,
}

/// Hints for downstream consumers (biome nudges, feature densities, edge treatment). Opaque to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorridorStyleConfig {
    pub biomes: Option<serde_json::Value>,
    pub features: Option<serde_json::Value>,
    pub edge: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeaLaneConfig {
    pub max_lanes: u32,
    /// Distance between sampled lines of the same family. At least `2`.
    pub scan_stride: u32,
    /// Minimum run length as a fraction of the line's span, clamped to `0.4..=1`.
    pub min_length_frac: f64,
    /// Also scan the two diagonal families.
    pub prefer_diagonals: bool,
    /// Minimum index distance between two chosen lanes of the same family.
    pub lane_spacing: u32,
    /// Width in tiles the channel must keep across its whole run. At least `1`.
    pub min_channel_width: u32,
    pub scoring: LaneScoring,
}

impl Default for SeaLaneConfig {
    fn default() -> Self {
        Self {
            max_lanes: 3,
            scan_stride: 6,
            min_length_frac: 0.7,
            prefer_diagonals: false,
            lane_spacing: 6,
            min_channel_width: 3,
            scoring: LaneScoring::default(),
        }
    }
}

impl SeaLaneConfig {
    pub fn normalized(&self) -> Self {
        Self {
            scan_stride: self.scan_stride.max(2),
            min_length_frac: self.min_length_frac.clamp(0.4, 1.0),
            min_channel_width: self.min_channel_width.max(1),
            ..self.clone()
        }
    }
}

/// Weights of the sea-lane score.
///
/// `score = len + width_weight * min_width + round(coverage * coverage_weight) + directionality_bias`, where the bias
/// blends wind and current alignment as `(wind_weight * |w·L| + current_weight * |c·L|) / (wind_weight + current_weight)`
/// with `current_weight = current_weight_base + current_weight_interplay * currents_follow_winds`, then scales by
/// `bias_scale * cohesion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaneScoring {
    pub axis_width_weight: i64,
    pub diagonal_width_weight: i64,
    pub coverage_weight: f64,
    pub bias_scale: f64,
    pub wind_weight: f64,
    pub current_weight_base: f64,
    pub current_weight_interplay: f64,
}

impl Default for LaneScoring {
    fn default() -> Self {
        Self {
            axis_width_weight: 3,
            diagonal_width_weight: 2,
            coverage_weight: 10.0,
            bias_scale: 25.0,
            wind_weight: 1.0,
            current_weight_base: 0.8,
            current_weight_interplay: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IslandHopConfig {
    pub use_hotspots: bool,
    pub max_arcs: u32,
}

impl Default for IslandHopConfig {
    fn default() -> Self {
        Self {
            use_hotspots: true,
            max_arcs: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandCorridorConfig {
    pub use_rift_shoulders: bool,
    pub max_corridors: u32,
    /// Minimum number of consecutive rift-shoulder tiles in a row. At least `12`.
    pub min_run_length: u32,
    /// Minimum row distance between two accepted corridors.
    pub spacing: u32,
    /// Elevation step to an axis neighbor that counts as rugged relief.
    pub relief_delta: i32,
}

impl Default for LandCorridorConfig {
    fn default() -> Self {
        Self {
            use_rift_shoulders: true,
            max_corridors: 2,
            min_run_length: 24,
            spacing: 0,
            relief_delta: 60,
        }
    }
}

impl LandCorridorConfig {
    pub fn normalized(&self) -> Self {
        Self {
            min_run_length: self.min_run_length.max(12),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiverChainConfig {
    pub max_chains: u32,
    /// Step budget of a single walk. At least `20`.
    pub max_steps: u32,
    /// Elevation under which tiles count as lowland; a walk may climb toward it from above.
    pub prefer_lowland_below: i32,
    /// Radius of the river-adjacency test for seed tiles. At least `1`.
    pub coast_seed_radius: u32,
    pub min_tiles: u32,
    pub must_end_near_coast: bool,
}

impl Default for RiverChainConfig {
    fn default() -> Self {
        Self {
            max_chains: 2,
            max_steps: 80,
            prefer_lowland_below: 300,
            coast_seed_radius: 2,
            min_tiles: 0,
            must_end_near_coast: false,
        }
    }
}

impl RiverChainConfig {
    pub fn normalized(&self) -> Self {
        Self {
            max_steps: self.max_steps.max(20),
            prefer_lowland_below: self.prefer_lowland_below.max(0),
            coast_seed_radius: self.coast_seed_radius.max(1),
            ..self.clone()
        }
    }
}
