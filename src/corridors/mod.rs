//! Strategic corridor tagging.
//!
//! Corridors are long-range traversal features recorded as story tags: open-water sea lanes, island-hop arcs around
//! hotspots, land corridors along rift shoulders, and river chains. Tagging runs in two phases, each an
//! `impl MapContext` block in one of the submodules:
//!
//! 1. [`CorridorStage::PreIslands`]: sea lanes, island-hop arcs, land corridors.
//! 2. [`CorridorStage::PostRivers`]: river chains, once an external stage has carved the rivers.
//!
//! Both phases end with a backfill that gives every corridor tile a kind and a style, then publish the
//! `"corridors"` overlay.

mod backfill;
mod directionality;
mod island_hop;
mod land;
mod river_chains;
mod sea_lanes;

use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use directionality::{AxisAlignment, Directionality, axis_vector};
pub use land::{LandSample, apply_directional_style, classify_land_style};
pub use sea_lanes::{SeaLaneCandidate, select_sea_lanes};

use crate::{
    MapContext,
    error::Result,
    grid::OffsetCoordinate,
    story::{
        CorridorKind, CorridorOverlaySummary, CorridorStyle, CorridorStylePrimitive, OverlayKey,
        OverlaySummary, StoryKey, StoryOverlaySnapshot,
    },
    viz,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorridorStage {
    PreIslands,
    PostRivers,
}

impl CorridorStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            CorridorStage::PreIslands => "preIslands",
            CorridorStage::PostRivers => "postRivers",
        }
    }
}

impl MapContext {
    /// Runs one corridor phase and publishes the resulting `"corridors"` overlay.
    ///
    /// Missing inputs (no hotspots, no rift shoulders, no qualifying lanes) are not errors: the affected pass tags
    /// nothing and records a warning in [`GenerationMetrics`](crate::map_context::GenerationMetrics).
    ///
    /// # Errors
    ///
    /// The passes themselves cannot fail. With `diagnostics.dumpDir` set, the corridor mask of the phase is written
    /// there as a PNG and a failed write is returned as [`MapGenError::Image`](crate::error::MapGenError::Image).
    pub fn tag_strategic_corridors(&mut self, stage: CorridorStage) -> Result<StoryOverlaySnapshot> {
        let started = Instant::now();

        match stage {
            CorridorStage::PreIslands => {
                self.tag_sea_lanes();
                self.tag_island_hop_from_hotspots();
                self.tag_land_corridors_from_rifts();
                self.backfill_corridor_kinds();
            }
            CorridorStage::PostRivers => {
                self.tag_river_chains_post_rivers();
                self.backfill_corridor_kinds();
            }
        }

        let summary = CorridorOverlaySummary::capture(stage, &self.story_tags);
        let snapshot = StoryOverlaySnapshot::new(
            OverlayKey::CORRIDORS,
            OverlayKey::CORRIDORS,
            (self.dimensions().width(), self.dimensions().height()),
            self.story_tags.corridor_tiles(),
            [],
            OverlaySummary::Corridors(Box::new(summary)),
        );
        let snapshot = self.overlays.publish(snapshot).clone();

        self.metrics
            .record_timing(&format!("corridors.{}", stage.as_str()), started.elapsed());
        let mut counts = CorridorKind::ALL.map(|kind| (kind.as_str(), 0usize));
        for kind in self.story_tags.corridor_kinds().values() {
            counts[*kind as usize].1 += 1;
        }
        self.metrics.record_histogram("corridors.kinds", counts);

        if let OverlaySummary::Corridors(summary) = &snapshot.summary {
            tracing::info!(
                target: "mapgen::corridors",
                stage = stage.as_str(),
                sea_lane_tiles = summary.sea_lane_tiles,
                island_hop_tiles = summary.island_hop_tiles,
                land_open_tiles = summary.land_open_tiles,
                river_chain_tiles = summary.river_chain_tiles,
                total_tiles = summary.total_tiles,
                "corridors.tagged"
            );
        }
        if self.config.diagnostics.log_histograms {
            tracing::debug!(
                target: "mapgen::corridors",
                histogram = ?self.metrics.histograms.get("corridors.kinds"),
                "corridors.histogram"
            );
        }
        if self.config.diagnostics.log_ascii {
            let ascii = viz::corridor_ascii(self);
            tracing::debug!(target: "mapgen::corridors", "corridors.ascii\n{ascii}");
        }
        if let Some(dump_dir) = &self.config.diagnostics.dump_dir {
            let path = std::path::Path::new(dump_dir).join(format!("corridors_{}.png", stage.as_str()));
            viz::write_grayscale_png(&path, self.dimensions(), &viz::corridor_mask(self))?;
        }

        Ok(snapshot)
    }

    /// Records the kind and style of a corridor tile, attaching the style primitive configured for the pair.
    fn assign_corridor_metadata(&mut self, key: StoryKey, kind: CorridorKind, style: CorridorStyle) {
        let attributes = self.corridor_style_primitive(kind, style);
        self.story_tags.assign_corridor(key, kind, style, attributes);
    }

    /// Looks up `corridors.kinds[kind].styles[style]`.
    pub fn corridor_style_primitive(
        &self,
        kind: CorridorKind,
        style: CorridorStyle,
    ) -> Option<CorridorStylePrimitive> {
        let style_config = self.config.corridors.kinds.get(&kind)?.styles.get(&style)?;
        Some(CorridorStylePrimitive {
            kind,
            style,
            biomes: style_config.biomes.clone(),
            features: style_config.features.clone(),
            edge: style_config.edge.clone(),
        })
    }

    /// Returns `true` if a land tile lies in the square window of `radius` around `tile`.
    fn is_adjacent_to_land(&self, tile: OffsetCoordinate, radius: u32) -> bool {
        self.dimensions()
            .tiles_in_window(tile, radius)
            .filter(|&neighbor| neighbor != tile)
            .any(|neighbor| !self.adapter().is_water(neighbor.x(), neighbor.y()))
    }
}
