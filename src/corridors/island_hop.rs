use crate::{
    MapContext,
    story::{CorridorKind, CorridorStyle, StoryKey, StoryTag},
};

/// Upper bound on hotspot draws, shared by all arcs of one pass.
const MAX_ATTEMPTS: usize = 100;

impl MapContext {
    /// Marks the water around randomly chosen hotspots as island-hop arcs.
    ///
    /// Each arc is the 3×3 window around a distinct hotspot; land tiles in the window are left alone.
    pub(super) fn tag_island_hop_from_hotspots(&mut self) {
        let config = self.config.corridors.island_hop.clone();
        if !config.use_hotspots || config.max_arcs == 0 {
            return;
        }
        let hotspots: Vec<StoryKey> = self
            .story_tags
            .keys(StoryTag::Hotspot)
            .iter()
            .copied()
            .collect();
        if hotspots.is_empty() {
            return;
        }

        let max_arcs = config.max_arcs as usize;
        let attempt_limit = MAX_ATTEMPTS.min(hotspots.len() * 2);
        let mut picked = vec![false; hotspots.len()];
        let mut arcs = 0;
        let mut attempts = 0;
        let mut tagged = 0;

        while arcs < max_arcs && attempts < attempt_limit {
            attempts += 1;
            let index = self.random("IslandHopPick", hotspots.len() as u32) as usize % hotspots.len();
            if picked[index] {
                continue;
            }
            picked[index] = true;
            arcs += 1;

            let center = hotspots[index].to_offset_coordinate();
            for tile in self.dimensions().tiles_in_window(center, 1) {
                if !self.adapter().is_water(tile.x(), tile.y()) {
                    continue;
                }
                let key = StoryKey::from(tile);
                self.story_tags.insert(StoryTag::CorridorIslandHop, key);
                self.assign_corridor_metadata(key, CorridorKind::IslandHop, CorridorStyle::Archipelago);
                tagged += 1;
            }
        }

        tracing::debug!(
            target: "mapgen::corridors",
            hotspots = hotspots.len(),
            arcs,
            attempts,
            tagged,
            "corridors.island_hop"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        MapContext,
        adapter::MockAdapter,
        grid::Dimensions,
        map_parameters::MapGenConfig,
        story::{CorridorKind, CorridorStyle, StoryKey, StoryTag},
    };

    fn ocean_context(seed: u64) -> MapContext {
        let dimensions = Dimensions::new(12, 12).unwrap();
        let adapter = MockAdapter::new(dimensions, seed)
            .with_ocean()
            .with_land(5..6, 5..6);
        MapContext::new(dimensions, Box::new(adapter), MapGenConfig::default())
    }

    #[test]
    fn no_hotspots_means_no_draws() {
        let mut context = ocean_context(1);
        context.tag_island_hop_from_hotspots();
        assert_eq!(context.story_tags.len(StoryTag::CorridorIslandHop), 0);
        assert_eq!(context.rng.count("IslandHopPick"), 0);
    }

    #[test]
    fn disabled_hotspots_are_ignored() {
        let mut context = ocean_context(1);
        context.config.corridors.island_hop.use_hotspots = false;
        context.story_tags.insert(StoryTag::Hotspot, StoryKey::new(5, 5));
        context.tag_island_hop_from_hotspots();
        assert_eq!(context.story_tags.len(StoryTag::CorridorIslandHop), 0);
    }

    #[test]
    fn single_hotspot_tags_surrounding_water() {
        let mut context = ocean_context(7);
        context.story_tags.insert(StoryTag::Hotspot, StoryKey::new(5, 5));
        context.tag_island_hop_from_hotspots();

        // The hotspot itself is land; the eight water tiles around it form the arc.
        assert_eq!(context.story_tags.len(StoryTag::CorridorIslandHop), 8);
        assert!(
            !context
                .story_tags
                .contains(StoryTag::CorridorIslandHop, StoryKey::new(5, 5))
        );
        let key = StoryKey::new(4, 6);
        assert_eq!(context.story_tags.corridor_kind(key), Some(CorridorKind::IslandHop));
        assert_eq!(
            context.story_tags.corridor_style(key),
            Some(CorridorStyle::Archipelago)
        );
        // One hotspot allows two attempts, the second of which repeats the first pick.
        assert_eq!(context.rng.count("IslandHopPick"), 2);
    }

    #[test]
    fn arcs_are_capped() {
        let mut context = ocean_context(11);
        context.config.corridors.island_hop.max_arcs = 1;
        for x in [1, 5, 9] {
            context.story_tags.insert(StoryTag::Hotspot, StoryKey::new(x, 1));
        }
        context.tag_island_hop_from_hotspots();
        assert!(context.story_tags.len(StoryTag::CorridorIslandHop) <= 9);
        assert_eq!(context.rng.count("IslandHopPick"), 1);
    }
}
