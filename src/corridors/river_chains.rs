use crate::{
    MapContext,
    grid::OffsetCoordinate,
    story::{CorridorKind, CorridorStyle, StoryKey, StoryTag},
};

/// Seed draws allowed per pass, successful or not.
const MAX_SEED_TRIES: u32 = 300;

impl MapContext {
    /// Follows carved rivers downhill from coastal seeds and tags the walked tiles as river chains.
    ///
    /// Seeds are random coastal land tiles near a river. From each seed the walk moves to a river-adjacent land
    /// neighbor that is no higher than the current tile, or that drops below the lowland threshold from above it.
    /// Ties among acceptable neighbors are broken randomly. A walk stops when no neighbor qualifies or after
    /// `max_steps` moves, so a chain never holds more than `max_steps` tiles.
    pub(super) fn tag_river_chains_post_rivers(&mut self) {
        let config = self.config.corridors.river.normalized();
        if config.max_chains == 0 {
            return;
        }

        let (width, height) = (self.width(), self.height());
        let mut chains = 0;
        let mut tries = 0;
        let mut tagged = 0;

        while chains < config.max_chains && tries < MAX_SEED_TRIES {
            tries += 1;
            let sx = self.random("RiverChainSX", width as u32) as i32;
            let sy = self.random("RiverChainSY", height as u32) as i32;
            if !self.in_bounds(sx, sy)
                || !self.adapter().is_coastal_land(sx, sy)
                || !self
                    .adapter()
                    .is_adjacent_to_rivers(sx, sy, config.coast_seed_radius)
            {
                continue;
            }

            let (path, end) = self.walk_river_chain(
                OffsetCoordinate::new(sx, sy),
                config.max_steps,
                config.prefer_lowland_below,
            );

            let ends_near_coast = !config.must_end_near_coast
                || self.adapter().is_coastal_land(end.x(), end.y())
                || self.adapter().is_adjacent_to_shallow_water(end.x(), end.y());
            if path.len() < config.min_tiles as usize || !ends_near_coast {
                continue;
            }

            for key in path {
                self.story_tags.insert(StoryTag::CorridorRiverChain, key);
                self.assign_corridor_metadata(key, CorridorKind::River, CorridorStyle::RiverChain);
                tagged += 1;
            }
            chains += 1;
        }

        tracing::debug!(
            target: "mapgen::corridors",
            chains,
            tries,
            tagged,
            "corridors.river_chains"
        );
    }

    /// Walks from `start` and returns the river-adjacent land tiles visited, in order, plus the final tile.
    fn walk_river_chain(
        &mut self,
        start: OffsetCoordinate,
        max_steps: u32,
        lowland_below: i32,
    ) -> (Vec<StoryKey>, OffsetCoordinate) {
        let mut current = start;
        let mut path = Vec::new();

        for _ in 0..max_steps {
            if self.is_river_land(current) {
                path.push(StoryKey::from(current));
            }

            let mut best = current;
            let mut best_elevation = self.elevation_at(current);
            let mut improved = false;

            // Row-major scan of the 3×3 window keeps the tie draws in a fixed order.
            let neighbors: Vec<_> = self
                .dimensions()
                .tiles_in_window(current, 1)
                .filter(|&tile| tile != current)
                .collect();
            for neighbor in neighbors {
                if !self.is_river_land(neighbor) {
                    continue;
                }
                let elevation = self.elevation_at(neighbor);
                let prefer = elevation <= best_elevation
                    || (elevation < lowland_below && best_elevation >= lowland_below);
                if !prefer {
                    continue;
                }
                if !improved || self.random("RiverChainTie", 3) == 0 {
                    best = neighbor;
                    best_elevation = elevation;
                    improved = true;
                }
            }

            if !improved {
                return (path, current);
            }
            current = best;
        }

        (path, current)
    }

    fn is_river_land(&self, tile: OffsetCoordinate) -> bool {
        !self.adapter().is_water(tile.x(), tile.y())
            && self.adapter().is_adjacent_to_rivers(tile.x(), tile.y(), 1)
    }

    fn elevation_at(&self, tile: OffsetCoordinate) -> i32 {
        self.adapter()
            .get_elevation(tile.x(), tile.y())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        MapContext,
        adapter::MockAdapter,
        grid::{Dimensions, OffsetCoordinate},
        map_parameters::MapGenConfig,
        story::{CorridorKind, CorridorStyle, StoryTag},
    };

    /// Ocean on the left three columns, a river along row 5 running inland, elevation rising eastward.
    fn river_context(seed: u64) -> MapContext {
        let dimensions = Dimensions::new(30, 11).unwrap();
        let adapter = MockAdapter::new(dimensions, seed)
            .with_water(0..3, 0..11)
            .with_rivers((3..28).map(|x| OffsetCoordinate::new(x, 5)))
            .with_elevation(|x, _| x * 20);
        MapContext::new(dimensions, Box::new(adapter), MapGenConfig::default())
    }

    #[test]
    fn zero_chains_draws_nothing() {
        let mut context = river_context(1);
        context.config.corridors.river.max_chains = 0;
        context.tag_river_chains_post_rivers();
        assert_eq!(context.rng.count("RiverChainSX"), 0);
        assert_eq!(context.story_tags.len(StoryTag::CorridorRiverChain), 0);
    }

    #[test]
    fn walk_never_exceeds_step_budget() {
        let mut context = river_context(5);
        // The coast column is level, so the walk keeps moving between its tiles until the budget runs out.
        let (path, _) = context.walk_river_chain(OffsetCoordinate::new(3, 5), 20, 300);
        assert!(!path.is_empty());
        assert!(path.len() <= 20);
    }

    #[test]
    fn walk_stops_at_a_local_minimum() {
        let dimensions = Dimensions::new(9, 9).unwrap();
        let adapter = MockAdapter::new(dimensions, 2)
            .with_rivers([OffsetCoordinate::new(4, 4)])
            .with_elevation(|x, y| 100 + (x - 4).abs() * 10 + (y - 4).abs() * 15);
        let mut context = MapContext::new(dimensions, Box::new(adapter), MapGenConfig::default());
        let (path, end) = context.walk_river_chain(OffsetCoordinate::new(3, 4), 40, 0);
        assert_eq!(end, OffsetCoordinate::new(4, 4));
        let tiles: Vec<_> = path.iter().map(|key| (key.x, key.y)).collect();
        assert_eq!(tiles, vec![(3, 4), (4, 4)]);
        assert_eq!(context.rng.count("RiverChainTie"), 0);
    }

    /// Four columns: ocean at `x = 0`, then land whose elevation is given by `elevation(x)`. Rivers on rows 1 and 3
    /// keep every land tile river-adjacent, so a quarter of all seed draws land on coastal river land.
    fn narrow_coast(seed: u64, elevation: fn(i32) -> i32, must_end_near_coast: bool) -> MapContext {
        let dimensions = Dimensions::new(4, 5).unwrap();
        let adapter = MockAdapter::new(dimensions, seed)
            .with_water(0..1, 0..5)
            .with_rivers(
                (1..4).flat_map(|x| [OffsetCoordinate::new(x, 1), OffsetCoordinate::new(x, 3)]),
            )
            .with_elevation(move |x, _| elevation(x));
        let mut context = MapContext::new(dimensions, Box::new(adapter), MapGenConfig::default());
        let river = &mut context.config.corridors.river;
        river.max_steps = 20;
        river.must_end_near_coast = must_end_near_coast;
        context
    }

    #[test]
    fn chains_are_tagged_as_river_corridors() {
        for seed in 1..=6 {
            let mut context = narrow_coast(seed, |x| x * 20, true);
            context.tag_river_chains_post_rivers();

            let tiles = context.story_tags.keys(StoryTag::CorridorRiverChain);
            assert!(!tiles.is_empty(), "seed {seed} tagged no river chain");
            assert!(tiles.len() <= 2 * 20);
            for &key in tiles {
                assert_eq!(context.story_tags.corridor_kind(key), Some(CorridorKind::River));
                assert_eq!(
                    context.story_tags.corridor_style(key),
                    Some(CorridorStyle::RiverChain)
                );
                // Elevation rises inland, so walks stay on the coastal column.
                assert_eq!(key.x, 1);
                assert!(context.adapter().is_coastal_land(key.x, key.y));
            }
            assert!(context.rng.count("RiverChainSX") <= 300);
        }
    }

    #[test]
    fn walk_length_matches_step_budget_on_level_coast() {
        let mut context = narrow_coast(3, |_| 100, false);
        let (path, end) = context.walk_river_chain(OffsetCoordinate::new(1, 2), 20, 0);
        assert_eq!(path.len(), 20);
        assert!(context.dimensions().in_bounds(end.x(), end.y()));
    }

    #[test]
    fn chains_ending_inland_are_dropped_when_coast_is_required() {
        for seed in 1..=6 {
            // Elevation falls inland, so every walk leaves the coast.
            let mut strict = narrow_coast(seed, |x| 100 - x * 20, true);
            strict.tag_river_chains_post_rivers();
            assert_eq!(strict.story_tags.len(StoryTag::CorridorRiverChain), 0);
            assert_eq!(strict.rng.count("RiverChainSX"), 300);

            let mut relaxed = narrow_coast(seed, |x| 100 - x * 20, false);
            relaxed.tag_river_chains_post_rivers();
            assert!(relaxed.story_tags.len(StoryTag::CorridorRiverChain) > 0);
        }
    }
}
