//! Sea lanes: long, wide runs of open water along the four lattice line families.

use enum_map::EnumMap;

use crate::{
    MapContext,
    corridors::Directionality,
    grid::{LineFamilies, LineOrientation, LineSpan, OffsetCoordinate, Run, longest_run},
    map_parameters::SeaLaneConfig,
    story::{CorridorKind, CorridorStyle, StoryKey, StoryTag},
};

/// Radius of the land test that separates coastal lanes from open-ocean lanes.
const COASTAL_RADIUS: u32 = 2;

/// A scanned line whose longest water run is long enough to become a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeaLaneCandidate {
    pub span: LineSpan,
    pub run: Run,
    /// `min_channel_width` if every probe passed, otherwise `1`.
    pub min_width: u32,
    pub score: i64,
}

impl SeaLaneCandidate {
    pub fn orientation(&self) -> LineOrientation {
        self.span.orientation
    }

    pub fn index(&self) -> i32 {
        self.span.index
    }
}

/// Greedily picks lanes by descending score.
///
/// Equal scores resolve by ascending line index, then by scan order. A candidate is skipped when a lane of the same
/// orientation within `lane_spacing` lines has already been chosen, so any two chosen lanes of one orientation are
/// at least `lane_spacing` apart.
pub fn select_sea_lanes(
    mut candidates: Vec<SeaLaneCandidate>,
    max_lanes: usize,
    lane_spacing: u32,
) -> Vec<SeaLaneCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.index().cmp(&b.index())));

    let mut chosen_indices: EnumMap<LineOrientation, Vec<i32>> = EnumMap::default();
    let mut lanes = Vec::new();
    for candidate in candidates {
        if lanes.len() >= max_lanes {
            break;
        }
        let chosen = &mut chosen_indices[candidate.orientation()];
        if chosen
            .iter()
            .any(|&index| index.abs_diff(candidate.index()) < lane_spacing)
        {
            continue;
        }
        chosen.push(candidate.index());
        lanes.push(candidate);
    }
    lanes
}

/// Line indices sampled for `orientation`.
///
/// Columns and rows skip the border lines; diagonals start from their first index. Every family advances by `stride`.
fn scan_indices(
    orientation: LineOrientation,
    context: &MapContext,
    stride: usize,
) -> impl Iterator<Item = i32> + use<> {
    let (width, height) = (context.width(), context.height());
    let range = match orientation {
        LineOrientation::Column => 1..=width - 2,
        LineOrientation::Row => 1..=height - 2,
        LineOrientation::DiagonalSum | LineOrientation::DiagonalDiff => {
            orientation.index_range(context.dimensions())
        }
    };
    range.step_by(stride)
}

impl MapContext {
    pub(super) fn tag_sea_lanes(&mut self) {
        let config = self.config.corridors.sea.normalized();
        let directionality = self.directionality();

        let candidates = self.find_sea_lane_candidates(&config, &directionality);
        let candidate_count = candidates.len();
        let lanes = select_sea_lanes(candidates, config.max_lanes as usize, config.lane_spacing);

        if lanes.is_empty() && config.max_lanes > 0 {
            self.metrics
                .warn("corridors.seaLanes: no water run met the length requirement");
        }

        for lane in &lanes {
            for tile in lane.span.run_tiles(lane.run) {
                if !self.adapter().is_water(tile.x(), tile.y()) {
                    continue;
                }
                let key = StoryKey::from(tile);
                self.story_tags.insert(StoryTag::CorridorSeaLane, key);
                let style = if self.is_adjacent_to_land(tile, COASTAL_RADIUS) {
                    CorridorStyle::Coastal
                } else {
                    CorridorStyle::Ocean
                };
                self.assign_corridor_metadata(key, CorridorKind::Sea, style);
            }
        }

        tracing::debug!(
            target: "mapgen::corridors",
            candidates = candidate_count,
            lanes = lanes.len(),
            prefer_diagonals = config.prefer_diagonals,
            "corridors.sea_lanes"
        );
    }

    /// Scans the configured line families and scores every line whose longest water run qualifies.
    ///
    /// Candidates are returned in scan order: columns, rows, then the two diagonal families.
    pub fn find_sea_lane_candidates(
        &self,
        config: &SeaLaneConfig,
        directionality: &Directionality,
    ) -> Vec<SeaLaneCandidate> {
        let config = config.normalized();
        let families = if config.prefer_diagonals {
            LineFamilies::AXES | LineFamilies::DIAGONALS
        } else {
            LineFamilies::AXES
        };

        let mut candidates = Vec::new();
        for orientation in families.orientations() {
            let bias = directionality.lane_bias(orientation, &config.scoring);
            let width_weight = if orientation.is_diagonal() {
                config.scoring.diagonal_width_weight
            } else {
                config.scoring.axis_width_weight
            };

            for index in scan_indices(orientation, self, config.scan_stride as usize) {
                let span = orientation.span(index, self.dimensions());
                if span.is_empty() {
                    continue;
                }
                let Some(run) = longest_run(
                    span.tiles()
                        .map(|tile| self.adapter().is_water(tile.x(), tile.y())),
                ) else {
                    continue;
                };
                let min_len = (span.len() as f64 * config.min_length_frac).floor() as usize;
                if run.len < min_len {
                    continue;
                }

                let min_width = if self.run_keeps_channel_width(&span, run, config.min_channel_width) {
                    config.min_channel_width
                } else {
                    1
                };
                let coverage = run.len as f64 / span.len() as f64;
                let score = run.len as i64
                    + width_weight * min_width as i64
                    + (coverage * config.scoring.coverage_weight).round() as i64
                    + bias;

                candidates.push(SeaLaneCandidate {
                    span,
                    run,
                    min_width,
                    score,
                });
            }
        }
        candidates
    }

    /// Probes about ten evenly spaced tiles of `run` for a perpendicular channel of `min_width` water tiles.
    fn run_keeps_channel_width(&self, span: &LineSpan, run: Run, min_width: u32) -> bool {
        let step = (run.len / 10).max(1);
        (run.start..=run.end)
            .step_by(step)
            .all(|position| self.has_channel_width(span.tile(position), span.orientation, min_width))
    }

    /// Returns `true` if `tile` and every tile within `(min_width - 1) / 2` steps across the line are water.
    ///
    /// A probe that leaves the map fails.
    fn has_channel_width(&self, tile: OffsetCoordinate, orientation: LineOrientation, min_width: u32) -> bool {
        let radius = (min_width.saturating_sub(1) / 2) as i32;
        if !self.adapter().is_water(tile.x(), tile.y()) {
            return false;
        }
        let across = orientation.perpendicular_step();
        (-radius..=radius).all(|offset| {
            let probe = tile.into_inner() + across * offset;
            self.in_bounds(probe.x, probe.y) && self.adapter().is_water(probe.x, probe.y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SeaLaneCandidate, select_sea_lanes};
    use crate::{
        MapContext,
        adapter::MockAdapter,
        corridors::Directionality,
        grid::{Dimensions, LineOrientation, Run},
        map_parameters::{DirectionalityConfig, MapGenConfig, SeaLaneConfig},
        story::StoryTag,
    };

    fn candidate(orientation: LineOrientation, index: i32, score: i64) -> SeaLaneCandidate {
        let dimensions = Dimensions::new(40, 40).unwrap();
        SeaLaneCandidate {
            span: orientation.span(index, dimensions),
            run: Run {
                start: 0,
                end: 9,
                len: 10,
            },
            min_width: 3,
            score,
        }
    }

    fn context(adapter: MockAdapter) -> MapContext {
        MapContext::new(adapter.dimensions(), Box::new(adapter), MapGenConfig::default())
    }

    #[test]
    fn selection_enforces_spacing_per_orientation() {
        let candidates = vec![
            candidate(LineOrientation::Column, 7, 50),
            candidate(LineOrientation::Column, 13, 49),
            candidate(LineOrientation::Column, 12, 48),
            candidate(LineOrientation::Row, 7, 47),
        ];
        let lanes = select_sea_lanes(candidates, 10, 6);
        let picked: Vec<_> = lanes
            .iter()
            .map(|lane| (lane.orientation(), lane.index()))
            .collect();
        assert_eq!(
            picked,
            vec![
                (LineOrientation::Column, 7),
                (LineOrientation::Column, 13),
                (LineOrientation::Row, 7)
            ]
        );
    }

    #[test]
    fn equal_scores_resolve_by_line_index() {
        let candidates = vec![
            candidate(LineOrientation::Row, 19, 30),
            candidate(LineOrientation::Row, 1, 30),
            candidate(LineOrientation::Row, 31, 30),
        ];
        let lanes = select_sea_lanes(candidates, 2, 0);
        let indices: Vec<_> = lanes.iter().map(|lane| lane.index()).collect();
        assert_eq!(indices, vec![1, 19]);
    }

    #[test]
    fn max_lanes_caps_selection() {
        let candidates = (0..8)
            .map(|i| candidate(LineOrientation::Row, i * 10, 100 - i as i64))
            .collect();
        assert_eq!(select_sea_lanes(candidates, 3, 6).len(), 3);
    }

    #[test]
    fn narrow_channel_is_kept_with_width_one() {
        let dimensions = Dimensions::new(20, 9).unwrap();
        // A single water row at y = 4 inside land.
        let adapter = MockAdapter::new(dimensions, 0).with_water(0..20, 4..5);
        let context = context(adapter);
        let config = SeaLaneConfig {
            scan_stride: 3,
            ..SeaLaneConfig::default()
        };
        let candidates = context.find_sea_lane_candidates(
            &config,
            &Directionality::resolve(&DirectionalityConfig::default()),
        );
        assert_eq!(candidates.len(), 1);
        let lane = candidates[0];
        assert_eq!(lane.orientation(), LineOrientation::Row);
        assert_eq!(lane.index(), 4);
        assert_eq!(lane.min_width, 1);
        // 20 + 3 * 1 + round(1.0 * 10)
        assert_eq!(lane.score, 33);
    }

    #[test]
    fn wide_channel_keeps_configured_width() {
        let dimensions = Dimensions::new(20, 9).unwrap();
        let adapter = MockAdapter::new(dimensions, 0).with_water(0..20, 3..6);
        let context = context(adapter);
        let config = SeaLaneConfig {
            scan_stride: 3,
            ..SeaLaneConfig::default()
        };
        let candidates = context.find_sea_lane_candidates(
            &config,
            &Directionality::resolve(&DirectionalityConfig::default()),
        );
        let lane = candidates
            .iter()
            .find(|lane| lane.index() == 4)
            .unwrap();
        assert_eq!(lane.min_width, 3);
        assert_eq!(lane.score, 20 + 9 + 10);
    }

    #[test]
    fn diagonals_are_scanned_only_when_preferred() {
        let dimensions = Dimensions::new(12, 12).unwrap();
        let context = context(MockAdapter::new(dimensions, 0).with_ocean());
        let directionality = Directionality::resolve(&DirectionalityConfig::default());

        let axes = context.find_sea_lane_candidates(&SeaLaneConfig::default(), &directionality);
        assert!(axes.iter().all(|lane| !lane.orientation().is_diagonal()));

        let config = SeaLaneConfig {
            prefer_diagonals: true,
            ..SeaLaneConfig::default()
        };
        let all = context.find_sea_lane_candidates(&config, &directionality);
        assert!(all.iter().any(|lane| lane.orientation() == LineOrientation::DiagonalSum));
        assert!(all.iter().any(|lane| lane.orientation() == LineOrientation::DiagonalDiff));

        // Diagonals advance by the stride from the start of their index range.
        let sums: Vec<_> = all
            .iter()
            .filter(|lane| lane.orientation() == LineOrientation::DiagonalSum)
            .map(|lane| lane.index())
            .collect();
        assert!(sums.iter().all(|index| index % 6 == 0));
        let diffs: Vec<_> = all
            .iter()
            .filter(|lane| lane.orientation() == LineOrientation::DiagonalDiff)
            .map(|lane| lane.index())
            .collect();
        assert!(diffs.iter().all(|index| (index + 11) % 6 == 0));
    }

    #[test]
    fn missing_lanes_warn_unless_none_were_requested() {
        let dimensions = Dimensions::new(12, 12).unwrap();

        let mut landlocked = context(MockAdapter::new(dimensions, 0));
        landlocked.tag_sea_lanes();
        assert_eq!(landlocked.metrics.warnings.len(), 1);

        let mut opted_out = context(MockAdapter::new(dimensions, 0).with_ocean());
        opted_out.config.corridors.sea.max_lanes = 0;
        opted_out.tag_sea_lanes();
        assert!(opted_out.metrics.warnings.is_empty());
        assert_eq!(opted_out.story_tags.len(StoryTag::CorridorSeaLane), 0);
    }
}
