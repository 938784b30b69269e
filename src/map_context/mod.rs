//! This module defines the [`MapContext`] struct, the aggregate every generation stage reads and writes.
//!
//! Its methods are split in the same way as the rest of the crate:
//! 1. Construction and plain accessors live in this file.
//! 2. Buffer writes/syncs, random draws and foundation access are defined in the [`impls`] submodule.
//! 3. The corridor tagging passes are `impl MapContext` blocks in [`crate::corridors`].

use std::sync::Arc;

use crate::{
    adapter::EngineAdapter,
    foundation::FoundationContext,
    grid::Dimensions,
    map_parameters::MapGenConfig,
    story::{StoryOverlayRegistry, StoryTags},
};

mod buffers;
mod impls;
mod metrics;

pub use buffers::*;
pub use impls::*;
pub use metrics::*;

/// Per-tile field arrays.
///
/// Each array is allocated once with exactly `dimensions.size()` entries and can be mutated but never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFields {
    /// Rainfall of each tile, `0..=200`.
    pub rainfall: Box<[u8]>,
    pub elevation: Box<[i16]>,
    pub temperature: Box<[u8]>,
    pub biome_id: Box<[u8]>,
    pub feature_type: Box<[i16]>,
    pub terrain_type: Box<[u8]>,
}

impl MapFields {
    pub fn new(size: usize) -> Self {
        Self {
            rainfall: vec![0; size].into_boxed_slice(),
            elevation: vec![0; size].into_boxed_slice(),
            temperature: vec![0; size].into_boxed_slice(),
            biome_id: vec![0; size].into_boxed_slice(),
            feature_type: vec![0; size].into_boxed_slice(),
            terrain_type: vec![0; size].into_boxed_slice(),
        }
    }
}

pub struct MapContext {
    dimensions: Dimensions,
    pub fields: MapFields,
    /// Per-label draw counters. See [`MapContext::random`].
    pub rng: RngState,
    pub metrics: GenerationMetrics,
    pub buffers: MapBuffers,
    /// Story tags published during this run.
    pub story_tags: StoryTags,
    /// Overlays published during this run.
    pub overlays: StoryOverlayRegistry,
    pub config: MapGenConfig,
    foundation: Option<Arc<FoundationContext>>,
    adapter: Box<dyn EngineAdapter>,
}

impl MapContext {
    /// Creates a context with zero-filled fields and buffers, no draws recorded and no foundation attached.
    pub fn new(
        dimensions: Dimensions,
        adapter: Box<dyn EngineAdapter>,
        config: MapGenConfig,
    ) -> Self {
        let size = dimensions.size();

        tracing::debug!(
            target: "mapgen::context",
            width = dimensions.width(),
            height = dimensions.height(),
            seed = ?config.seed,
            "context.created"
        );

        Self {
            dimensions,
            fields: MapFields::new(size),
            rng: RngState {
                seed: config.seed,
                ..RngState::default()
            },
            metrics: GenerationMetrics::default(),
            buffers: MapBuffers::new(size),
            story_tags: StoryTags::new(),
            overlays: StoryOverlayRegistry::default(),
            config,
            foundation: None,
            adapter,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.dimensions.width() as i32
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.dimensions.height() as i32
    }

    /// Linear index of `(x, y)`, or `None` if the tile is outside the map.
    #[inline]
    pub fn idx(&self, x: i32, y: i32) -> Option<usize> {
        self.dimensions.index(x, y)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.dimensions.in_bounds(x, y)
    }

    pub fn adapter(&self) -> &dyn EngineAdapter {
        self.adapter.as_ref()
    }

    /// Mutable access to the terrain authority.
    ///
    /// Stages that bypass the staged buffers this way (river carving, for example) must call
    /// [`MapContext::sync_heightfield`] and [`MapContext::sync_climate_field`] afterwards.
    pub fn adapter_mut(&mut self) -> &mut dyn EngineAdapter {
        self.adapter.as_mut()
    }

    /// Returns the attached foundation snapshot, if any.
    pub fn foundation(&self) -> Option<&Arc<FoundationContext>> {
        self.foundation.as_ref()
    }
}
