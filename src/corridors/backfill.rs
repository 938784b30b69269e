use crate::{
    MapContext,
    story::{CorridorKind, CorridorStyle, StoryKey},
};

impl MapContext {
    /// Gives every tile of a corridor tag set a kind and a style, keeping the ones already assigned.
    ///
    /// Tiles tagged by hydration or by an earlier phase may lack metadata; they receive the default kind of their
    /// set and its default style. Running this twice changes nothing.
    pub(super) fn backfill_corridor_kinds(&mut self) {
        for set_kind in CorridorKind::ALL {
            let keys: Vec<StoryKey> = self
                .story_tags
                .keys(set_kind.tag())
                .iter()
                .copied()
                .collect();
            for key in keys {
                let kind = self.story_tags.corridor_kind(key).unwrap_or(set_kind);
                let style = match self.story_tags.corridor_style(key) {
                    Some(style) => style,
                    None => self.default_corridor_style(set_kind, key),
                };
                self.assign_corridor_metadata(key, kind, style);
            }
        }
    }

    fn default_corridor_style(&self, kind: CorridorKind, key: StoryKey) -> CorridorStyle {
        match kind {
            CorridorKind::Sea if self.adapter().is_adjacent_to_shallow_water(key.x, key.y) => {
                CorridorStyle::Coastal
            }
            CorridorKind::Sea => CorridorStyle::Ocean,
            CorridorKind::IslandHop => CorridorStyle::Archipelago,
            CorridorKind::Land => CorridorStyle::PlainsBelt,
            CorridorKind::River => CorridorStyle::RiverChain,
        }
    }
}
