//! Land corridors along rift shoulders, styled by the terrain they cross.

use glam::DVec2;

use crate::{
    MapContext,
    corridors::Directionality,
    grid::Direction,
    story::{CorridorKind, CorridorStyle, StoryKey, StoryTag},
};

/// Aggregate terrain of the land tiles in one corridor run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandSample {
    /// Rounded mean elevation of the sampled tiles.
    pub avg_elevation: i32,
    /// Rounded mean rainfall of the sampled tiles.
    pub avg_rainfall: i32,
    /// Share of sampled tiles with a steep step to an axis neighbor, in `0..=1`.
    pub relief_fraction: f64,
    /// Absolute latitude of the row, in degrees.
    pub latitude: f64,
}

/// Baseline style of a land corridor from its terrain alone. The first matching rule wins.
pub fn classify_land_style(sample: &LandSample) -> CorridorStyle {
    let LandSample {
        avg_elevation: elevation,
        avg_rainfall: rainfall,
        relief_fraction: relief,
        latitude,
    } = *sample;

    if relief > 0.35 && rainfall < 95 {
        CorridorStyle::Canyon
    } else if elevation > 650 && relief < 0.2 {
        CorridorStyle::Plateau
    } else if elevation > 550 && relief < 0.35 {
        CorridorStyle::FlatMtn
    } else if rainfall < 85 && latitude < 35.0 {
        CorridorStyle::DesertBelt
    } else if rainfall > 115 {
        CorridorStyle::GrasslandBelt
    } else {
        CorridorStyle::PlainsBelt
    }
}

/// Adjusts the baseline style of a corridor running along `direction` by its alignment with the plate and wind axes.
///
/// Plate alignment is applied first and wind alignment may override it. Without cohesion the baseline is returned
/// as is.
pub fn apply_directional_style(
    baseline: CorridorStyle,
    sample: &LandSample,
    directionality: &Directionality,
    direction: DVec2,
) -> CorridorStyle {
    if !directionality.is_enabled() {
        return baseline;
    }
    let LandSample {
        avg_elevation: elevation,
        avg_rainfall: rainfall,
        relief_fraction: relief,
        latitude,
    } = *sample;
    let cohesion = directionality.cohesion;
    let high = 0.75 * cohesion + 0.1;
    let mid = 0.5 * cohesion + 0.1;
    let alignment = directionality.raw_alignment(direction);
    let mut style = baseline;

    if alignment.plate >= high {
        if elevation > 650 && relief < 0.28 {
            style = CorridorStyle::Plateau;
        } else if relief > 0.3 && rainfall < 100 {
            style = CorridorStyle::Canyon;
        } else if elevation > 560 && relief < 0.35 {
            style = CorridorStyle::FlatMtn;
        }
    } else if alignment.plate >= mid && elevation > 600 && relief < 0.25 {
        style = CorridorStyle::Plateau;
    }

    if alignment.wind >= high {
        if rainfall > 110 || (latitude < 25.0 && rainfall > 100) {
            style = CorridorStyle::GrasslandBelt;
        } else if rainfall < 90 && latitude < 35.0 {
            style = CorridorStyle::DesertBelt;
        }
    } else if alignment.wind >= mid && rainfall > 120 {
        style = CorridorStyle::GrasslandBelt;
    }

    style
}

impl MapContext {
    /// Turns long horizontal runs of rift-shoulder tiles into land corridors.
    pub(super) fn tag_land_corridors_from_rifts(&mut self) {
        let config = self.config.corridors.land.normalized();
        if !config.use_rift_shoulders || config.max_corridors == 0 {
            return;
        }
        if self.story_tags.len(StoryTag::RiftShoulder) == 0 {
            return;
        }

        let directionality = self.directionality();
        let (width, height) = (self.width(), self.height());
        let min_run = config.min_run_length as i32;
        let max_corridors = config.max_corridors as usize;
        let mut used_rows: Vec<i32> = Vec::new();

        'rows: for y in 1..height - 1 {
            let mut x = 1;
            while x < width - 1 {
                if used_rows.len() >= max_corridors {
                    break 'rows;
                }
                while x < width - 1 && !self.is_rift_shoulder(x, y) {
                    x += 1;
                }
                if x >= width - 1 {
                    break;
                }
                let start = x;
                while x < width - 1 && self.is_rift_shoulder(x, y) {
                    x += 1;
                }
                let end = x - 1;
                if end - start + 1 < min_run {
                    continue;
                }
                if used_rows
                    .iter()
                    .any(|&row| row.abs_diff(y) < config.spacing)
                {
                    continue;
                }

                let sample = self.sample_land_run(y, start..=end, config.relief_delta);
                let style = apply_directional_style(
                    classify_land_style(&sample),
                    &sample,
                    &directionality,
                    DVec2::X,
                );

                for cx in start..=end {
                    if self.adapter().is_water(cx, y) {
                        continue;
                    }
                    let key = StoryKey::new(cx, y);
                    self.story_tags.insert(StoryTag::CorridorLandOpen, key);
                    self.assign_corridor_metadata(key, CorridorKind::Land, style);
                }

                tracing::debug!(
                    target: "mapgen::corridors",
                    row = y,
                    start,
                    end,
                    style = style.as_str(),
                    "corridors.land_run"
                );
                used_rows.push(y);
            }
        }

        if used_rows.is_empty() {
            self.metrics
                .warn("corridors.land: no rift-shoulder run met the length requirement");
        }
    }

    fn is_rift_shoulder(&self, x: i32, y: i32) -> bool {
        self.story_tags
            .contains(StoryTag::RiftShoulder, StoryKey::new(x, y))
    }

    /// Averages the land tiles of row `y` over `columns`.
    ///
    /// A tile counts toward relief when its elevation differs by at least `relief_delta` from one of its four axis
    /// neighbors; neighbors past the map edge are clamped back onto the edge tile.
    fn sample_land_run(
        &self,
        y: i32,
        columns: std::ops::RangeInclusive<i32>,
        relief_delta: i32,
    ) -> LandSample {
        let adapter = self.adapter();
        let (width, height) = (self.width(), self.height());
        let elevation_at = |x: i32, y: i32| adapter.get_elevation(x, y).unwrap_or_default();

        let mut total_elevation = 0i64;
        let mut total_rainfall = 0i64;
        let mut samples = 0usize;
        let mut relief_hits = 0usize;

        for x in columns {
            if adapter.is_water(x, y) {
                continue;
            }
            let elevation = elevation_at(x, y);
            total_elevation += elevation as i64;
            total_rainfall += adapter.get_rainfall(x, y).unwrap_or_default() as i64;
            samples += 1;

            let steepest = Direction::ORTHOGONAL
                .into_iter()
                .map(|direction| {
                    let offset = direction.offset();
                    let nx = (x + offset.x).clamp(0, width - 1);
                    let ny = (y + offset.y).clamp(0, height - 1);
                    (elevation - elevation_at(nx, ny)).abs()
                })
                .max()
                .unwrap_or(0);
            if steepest >= relief_delta {
                relief_hits += 1;
            }
        }

        if samples == 0 {
            return LandSample {
                latitude: adapter.get_latitude(0, y).abs(),
                ..LandSample::default()
            };
        }
        LandSample {
            avg_elevation: (total_elevation as f64 / samples as f64).round() as i32,
            avg_rainfall: (total_rainfall as f64 / samples as f64).round() as i32,
            relief_fraction: relief_hits as f64 / samples as f64,
            latitude: adapter.get_latitude(0, y).abs(),
        }
    }
}
