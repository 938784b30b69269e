//! Story tags: the cross-stage blackboard of tile classifications.
//!
//! Upstream stages publish sparse tile sets ("hotspot", "riftShoulder", ...) and the corridor engine adds its own
//! corridor sets plus a kind/style classification per tile. The registry is owned by [`MapContext`](crate::MapContext)
//! and is append-only within a run: entries are never removed, except through [`StoryTags::clear`] before a new run
//! or when a corridor snapshot is hydrated with `clear` set.

mod overlays;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    num::ParseIntError,
    str::FromStr,
};

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

pub use overlays::*;

use crate::grid::OffsetCoordinate;

/// Canonical tile key, rendered as `"x,y"`.
///
/// Keys order by `x` first, then `y`, so iterating a tag collection is deterministic regardless of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoryKey {
    pub x: i32,
    pub y: i32,
}

impl StoryKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn to_offset_coordinate(self) -> OffsetCoordinate {
        OffsetCoordinate::new(self.x, self.y)
    }
}

impl From<OffsetCoordinate> for StoryKey {
    fn from(coordinate: OffsetCoordinate) -> Self {
        Self::new(coordinate.x(), coordinate.y())
    }
}

impl fmt::Display for StoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStoryKeyError {
    MissingComma,
    InvalidComponent(ParseIntError),
}

impl fmt::Display for ParseStoryKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStoryKeyError::MissingComma => write!(f, "story key must have the form \"x,y\""),
            ParseStoryKeyError::InvalidComponent(error) => {
                write!(f, "invalid story key component: {error}")
            }
        }
    }
}

impl std::error::Error for ParseStoryKeyError {}

impl FromStr for StoryKey {
    type Err = ParseStoryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or(ParseStoryKeyError::MissingComma)?;
        let x = x.trim().parse().map_err(ParseStoryKeyError::InvalidComponent)?;
        let y = y.trim().parse().map_err(ParseStoryKeyError::InvalidComponent)?;
        Ok(Self::new(x, y))
    }
}

impl Serialize for StoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StoryKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The tile sets tracked by [`StoryTags`].
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryTag {
    Hotspot,
    RiftLine,
    RiftShoulder,
    ActiveMargin,
    PassiveShelf,
    CorridorSeaLane,
    CorridorIslandHop,
    CorridorLandOpen,
    CorridorRiverChain,
}

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorridorKind {
    Sea,
    IslandHop,
    Land,
    River,
}

impl CorridorKind {
    pub const ALL: [Self; 4] = [
        CorridorKind::Sea,
        CorridorKind::IslandHop,
        CorridorKind::Land,
        CorridorKind::River,
    ];

    /// The tile set that records membership in this kind of corridor.
    pub const fn tag(self) -> StoryTag {
        match self {
            CorridorKind::Sea => StoryTag::CorridorSeaLane,
            CorridorKind::IslandHop => StoryTag::CorridorIslandHop,
            CorridorKind::Land => StoryTag::CorridorLandOpen,
            CorridorKind::River => StoryTag::CorridorRiverChain,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CorridorKind::Sea => "sea",
            CorridorKind::IslandHop => "islandHop",
            CorridorKind::Land => "land",
            CorridorKind::River => "river",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorridorStyle {
    Ocean,
    Coastal,
    Archipelago,
    Canyon,
    Plateau,
    FlatMtn,
    DesertBelt,
    GrasslandBelt,
    PlainsBelt,
    RiverChain,
}

impl CorridorStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            CorridorStyle::Ocean => "ocean",
            CorridorStyle::Coastal => "coastal",
            CorridorStyle::Archipelago => "archipelago",
            CorridorStyle::Canyon => "canyon",
            CorridorStyle::Plateau => "plateau",
            CorridorStyle::FlatMtn => "flatMtn",
            CorridorStyle::DesertBelt => "desertBelt",
            CorridorStyle::GrasslandBelt => "grasslandBelt",
            CorridorStyle::PlainsBelt => "plainsBelt",
            CorridorStyle::RiverChain => "riverChain",
        }
    }
}

/// Style hints attached to a corridor tile, copied from `corridors.kinds[kind].styles[style]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorStylePrimitive {
    pub kind: CorridorKind,
    pub style: CorridorStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biomes: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<serde_json::Value>,
}

/// Registry of story tags for one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryTags {
    sets: EnumMap<StoryTag, BTreeSet<StoryKey>>,
    corridor_kind: BTreeMap<StoryKey, CorridorKind>,
    corridor_style: BTreeMap<StoryKey, CorridorStyle>,
    corridor_attributes: BTreeMap<StoryKey, CorridorStylePrimitive>,
}

impl StoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` to the `tag` set. Returns `true` if the key was not present yet.
    pub fn insert(&mut self, tag: StoryTag, key: StoryKey) -> bool {
        self.sets[tag].insert(key)
    }

    pub fn contains(&self, tag: StoryTag, key: StoryKey) -> bool {
        self.sets[tag].contains(&key)
    }

    /// The keys of the `tag` set, in key order.
    pub fn keys(&self, tag: StoryTag) -> &BTreeSet<StoryKey> {
        &self.sets[tag]
    }

    pub fn len(&self, tag: StoryTag) -> usize {
        self.sets[tag].len()
    }

    pub fn corridor_kind(&self, key: StoryKey) -> Option<CorridorKind> {
        self.corridor_kind.get(&key).copied()
    }

    pub fn corridor_style(&self, key: StoryKey) -> Option<CorridorStyle> {
        self.corridor_style.get(&key).copied()
    }

    pub fn corridor_attributes(&self, key: StoryKey) -> Option<&CorridorStylePrimitive> {
        self.corridor_attributes.get(&key)
    }

    pub fn corridor_kinds(&self) -> &BTreeMap<StoryKey, CorridorKind> {
        &self.corridor_kind
    }

    pub fn corridor_styles(&self) -> &BTreeMap<StoryKey, CorridorStyle> {
        &self.corridor_style
    }

    pub fn corridor_attribute_map(&self) -> &BTreeMap<StoryKey, CorridorStylePrimitive> {
        &self.corridor_attributes
    }

    /// Records the kind and style of a corridor tile and replaces its attributes.
    ///
    /// Passing `None` as `attributes` drops any attributes a previous assignment attached, so the attributes always
    /// describe the current kind/style pair.
    pub fn assign_corridor(
        &mut self,
        key: StoryKey,
        kind: CorridorKind,
        style: CorridorStyle,
        attributes: Option<CorridorStylePrimitive>,
    ) {
        self.corridor_kind.insert(key, kind);
        self.corridor_style.insert(key, style);
        match attributes {
            Some(primitive) => {
                self.corridor_attributes.insert(key, primitive);
            }
            None => {
                self.corridor_attributes.remove(&key);
            }
        }
    }

    /// Union of the four corridor sets.
    pub fn corridor_tiles(&self) -> BTreeSet<StoryKey> {
        CorridorKind::ALL
            .into_iter()
            .flat_map(|kind| self.sets[kind.tag()].iter().copied())
            .collect()
    }

    /// Forgets every corridor set and classification, leaving upstream tags intact.
    pub fn clear_corridors(&mut self) {
        CorridorKind::ALL
            .into_iter()
            .for_each(|kind| self.sets[kind.tag()].clear());
        self.corridor_kind.clear();
        self.corridor_style.clear();
        self.corridor_attributes.clear();
    }

    /// Resets the registry for a fresh generation run.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{CorridorKind, CorridorStyle, StoryKey, StoryTag, StoryTags};

    #[test]
    fn story_key_round_trips_through_string() {
        let key = StoryKey::new(12, -3);
        assert_eq!(key.to_string(), "12,-3");
        assert_eq!("12,-3".parse::<StoryKey>(), Ok(key));
        assert!("12".parse::<StoryKey>().is_err());
        assert!("a,b".parse::<StoryKey>().is_err());
    }

    #[test]
    fn story_key_serializes_as_string_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(StoryKey::new(1, 2), CorridorStyle::FlatMtn);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1,2":"flatMtn"}"#);
    }

    #[test]
    fn assign_without_attributes_drops_previous_ones() {
        let mut tags = StoryTags::new();
        let key = StoryKey::new(0, 0);
        tags.insert(StoryTag::CorridorSeaLane, key);
        tags.assign_corridor(
            key,
            CorridorKind::Sea,
            CorridorStyle::Ocean,
            Some(super::CorridorStylePrimitive {
                kind: CorridorKind::Sea,
                style: CorridorStyle::Ocean,
                biomes: None,
                features: None,
                edge: None,
            }),
        );
        assert!(tags.corridor_attributes(key).is_some());

        tags.assign_corridor(key, CorridorKind::Sea, CorridorStyle::Coastal, None);
        assert_eq!(tags.corridor_style(key), Some(CorridorStyle::Coastal));
        assert!(tags.corridor_attributes(key).is_none());
    }

    #[test]
    fn clear_corridors_keeps_upstream_tags() {
        let mut tags = StoryTags::new();
        tags.insert(StoryTag::Hotspot, StoryKey::new(3, 3));
        tags.insert(StoryTag::CorridorLandOpen, StoryKey::new(4, 4));
        tags.assign_corridor(
            StoryKey::new(4, 4),
            CorridorKind::Land,
            CorridorStyle::PlainsBelt,
            None,
        );
        tags.clear_corridors();
        assert_eq!(tags.len(StoryTag::Hotspot), 1);
        assert!(tags.corridor_tiles().is_empty());
        assert!(tags.corridor_kinds().is_empty());
    }
}
