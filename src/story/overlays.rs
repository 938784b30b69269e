//! Story overlays: immutable snapshots of tag collections, published once per phase for downstream stages.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    corridors::CorridorStage,
    story::{CorridorKind, CorridorStyle, CorridorStylePrimitive, StoryKey, StoryTag, StoryTags},
};

/// Well-known overlay keys.
pub struct OverlayKey;

impl OverlayKey {
    pub const MARGINS: &'static str = "margins";
    pub const HOTSPOTS: &'static str = "hotspots";
    pub const RIFTS: &'static str = "rifts";
    pub const OROGENY: &'static str = "orogeny";
    pub const CORRIDORS: &'static str = "corridors";
    pub const SWATCHES: &'static str = "swatches";
    pub const PALEO: &'static str = "paleo";
}

/// A published overlay.
///
/// `active` and `passive` hold tile keys with duplicates removed, keeping first-occurrence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOverlaySnapshot {
    pub key: String,
    pub kind: String,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub active: Vec<StoryKey>,
    pub passive: Vec<StoryKey>,
    pub summary: OverlaySummary,
}

impl StoryOverlaySnapshot {
    /// Builds a snapshot, deduplicating the key arrays. An empty `kind` falls back to `key`.
    pub fn new(
        key: impl Into<String>,
        kind: impl Into<String>,
        (width, height): (u32, u32),
        active: impl IntoIterator<Item = StoryKey>,
        passive: impl IntoIterator<Item = StoryKey>,
        summary: OverlaySummary,
    ) -> Self {
        let key: String = key.into();
        let kind: String = kind.into();
        let kind = if kind.is_empty() { key.clone() } else { kind };
        Self {
            key,
            kind,
            version: 1,
            width,
            height,
            active: dedup_keys(active),
            passive: dedup_keys(passive),
            summary,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn dedup_keys(keys: impl IntoIterator<Item = StoryKey>) -> Vec<StoryKey> {
    let mut seen = BTreeSet::new();
    keys.into_iter().filter(|key| seen.insert(*key)).collect()
}

/// Overlay-specific summary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverlaySummary {
    Corridors(Box<CorridorOverlaySummary>),
    Other(serde_json::Map<String, serde_json::Value>),
}

impl Default for OverlaySummary {
    fn default() -> Self {
        OverlaySummary::Other(serde_json::Map::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorOverlaySummary {
    pub stage: CorridorStage,
    pub sea_lane: Vec<StoryKey>,
    pub island_hop: Vec<StoryKey>,
    pub land_open: Vec<StoryKey>,
    pub river_chain: Vec<StoryKey>,
    pub kind_by_tile: BTreeMap<StoryKey, CorridorKind>,
    pub style_by_tile: BTreeMap<StoryKey, CorridorStyle>,
    pub attributes_by_tile: BTreeMap<StoryKey, CorridorStylePrimitive>,
    pub sea_lane_tiles: usize,
    pub island_hop_tiles: usize,
    pub land_open_tiles: usize,
    pub river_chain_tiles: usize,
    pub total_tiles: usize,
}

impl CorridorOverlaySummary {
    /// Captures the current corridor state of `tags`.
    pub fn capture(stage: CorridorStage, tags: &StoryTags) -> Self {
        let list = |tag: StoryTag| tags.keys(tag).iter().copied().collect::<Vec<_>>();
        let sea_lane = list(StoryTag::CorridorSeaLane);
        let island_hop = list(StoryTag::CorridorIslandHop);
        let land_open = list(StoryTag::CorridorLandOpen);
        let river_chain = list(StoryTag::CorridorRiverChain);
        Self {
            stage,
            sea_lane_tiles: sea_lane.len(),
            island_hop_tiles: island_hop.len(),
            land_open_tiles: land_open.len(),
            river_chain_tiles: river_chain.len(),
            total_tiles: tags.corridor_tiles().len(),
            sea_lane,
            island_hop,
            land_open,
            river_chain,
            kind_by_tile: tags.corridor_kinds().clone(),
            style_by_tile: tags.corridor_styles().clone(),
            attributes_by_tile: tags.corridor_attribute_map().clone(),
        }
    }

    fn tiles(&self, kind: CorridorKind) -> &[StoryKey] {
        match kind {
            CorridorKind::Sea => &self.sea_lane,
            CorridorKind::IslandHop => &self.island_hop,
            CorridorKind::Land => &self.land_open,
            CorridorKind::River => &self.river_chain,
        }
    }
}

/// Overlays published during the current run, keyed by overlay key. Republishing a key replaces the snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryOverlayRegistry {
    overlays: BTreeMap<String, StoryOverlaySnapshot>,
}

impl StoryOverlayRegistry {
    pub fn publish(&mut self, snapshot: StoryOverlaySnapshot) -> &StoryOverlaySnapshot {
        let key = snapshot.key.clone();
        self.overlays.insert(key.clone(), snapshot);
        &self.overlays[&key]
    }

    pub fn get(&self, key: &str) -> Option<&StoryOverlaySnapshot> {
        self.overlays.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoryOverlaySnapshot)> {
        self.overlays
            .iter()
            .map(|(key, snapshot)| (key.as_str(), snapshot))
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn clear(&mut self) {
        self.overlays.clear();
    }
}

impl StoryTags {
    /// Rebuilds the corridor tags from a published corridor overlay.
    ///
    /// With `clear` set the existing corridor tags are dropped first. Snapshots that do not carry a corridor summary
    /// leave the tags untouched.
    pub fn hydrate_corridors(&mut self, overlay: &StoryOverlaySnapshot, clear: bool) {
        let OverlaySummary::Corridors(summary) = &overlay.summary else {
            return;
        };
        if clear {
            self.clear_corridors();
        }
        for kind in CorridorKind::ALL {
            for &key in summary.tiles(kind) {
                self.insert(kind.tag(), key);
            }
        }
        self.corridor_kind
            .extend(summary.kind_by_tile.iter().map(|(&key, &kind)| (key, kind)));
        self.corridor_style
            .extend(summary.style_by_tile.iter().map(|(&key, &style)| (key, style)));
        self.corridor_attributes.extend(
            summary
                .attributes_by_tile
                .iter()
                .map(|(&key, primitive)| (key, primitive.clone())),
        );
    }

    /// Fills the margin sets from a margins overlay: `active` becomes active margins, `passive` passive shelves.
    pub fn hydrate_margins(&mut self, overlay: &StoryOverlaySnapshot, clear: bool) {
        self.hydrate_pair(overlay, StoryTag::ActiveMargin, StoryTag::PassiveShelf, clear);
    }

    /// Fills the rift sets from a rifts overlay: `active` becomes rift lines, `passive` rift shoulders.
    pub fn hydrate_rifts(&mut self, overlay: &StoryOverlaySnapshot, clear: bool) {
        self.hydrate_pair(overlay, StoryTag::RiftLine, StoryTag::RiftShoulder, clear);
    }

    fn hydrate_pair(
        &mut self,
        overlay: &StoryOverlaySnapshot,
        active: StoryTag,
        passive: StoryTag,
        clear: bool,
    ) {
        if clear {
            self.sets[active].clear();
            self.sets[passive].clear();
        }
        self.sets[active].extend(overlay.active.iter().copied());
        self.sets[passive].extend(overlay.passive.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::{CorridorOverlaySummary, OverlayKey, OverlaySummary, StoryOverlaySnapshot};
    use crate::{
        corridors::CorridorStage,
        story::{CorridorKind, CorridorStyle, StoryKey, StoryTag, StoryTags},
    };

    #[test]
    fn snapshot_dedups_keys_in_order() {
        let snapshot = StoryOverlaySnapshot::new(
            OverlayKey::MARGINS,
            "",
            (4, 4),
            [
                StoryKey::new(2, 0),
                StoryKey::new(1, 0),
                StoryKey::new(2, 0),
            ],
            [],
            OverlaySummary::default(),
        );
        assert_eq!(snapshot.kind, OverlayKey::MARGINS);
        assert_eq!(
            snapshot.active,
            vec![StoryKey::new(2, 0), StoryKey::new(1, 0)]
        );
    }

    #[test]
    fn corridor_snapshot_hydrates_an_empty_registry() {
        let mut tags = StoryTags::new();
        let key = StoryKey::new(5, 1);
        tags.insert(StoryTag::CorridorRiverChain, key);
        tags.assign_corridor(key, CorridorKind::River, CorridorStyle::RiverChain, None);

        let summary = CorridorOverlaySummary::capture(CorridorStage::PostRivers, &tags);
        let snapshot = StoryOverlaySnapshot::new(
            OverlayKey::CORRIDORS,
            OverlayKey::CORRIDORS,
            (8, 8),
            tags.corridor_tiles(),
            [],
            OverlaySummary::Corridors(Box::new(summary)),
        );

        let json = snapshot.to_json().unwrap();
        let restored = StoryOverlaySnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);

        let mut hydrated = StoryTags::new();
        hydrated.insert(StoryTag::CorridorSeaLane, StoryKey::new(0, 0));
        hydrated.hydrate_corridors(&restored, true);
        assert_eq!(hydrated.corridor_kinds(), tags.corridor_kinds());
        assert_eq!(hydrated.corridor_tiles(), tags.corridor_tiles());
    }

    #[test]
    fn rifts_overlay_fills_line_and_shoulder_sets() {
        let snapshot = StoryOverlaySnapshot::new(
            OverlayKey::RIFTS,
            OverlayKey::RIFTS,
            (4, 4),
            [StoryKey::new(1, 1)],
            [StoryKey::new(1, 2), StoryKey::new(2, 2)],
            OverlaySummary::default(),
        );
        let mut tags = StoryTags::new();
        tags.hydrate_rifts(&snapshot, true);
        assert_eq!(tags.len(StoryTag::RiftLine), 1);
        assert_eq!(tags.len(StoryTag::RiftShoulder), 2);
    }
}
