//! Core of a staged procedural map generator.
//!
//! A generation run owns one [`MapContext`]: the map dimensions, the per-tile field and buffer arrays, the story tag
//! registry and the published overlays. All terrain reads and writes, and every random draw, go through the
//! [`EngineAdapter`] the context was built with. An optional [`FoundationContext`] carries the immutable tectonic
//! and climate tensors produced by an earlier stage.
//!
//! The corridor stages run on top of that context:
//!
//! ```
//! use mapgen_core::{
//!     CorridorStage, MapContext, MapGenConfig, adapter::MockAdapter, grid::Dimensions,
//! };
//!
//! let dimensions = Dimensions::new(24, 16).unwrap();
//! let adapter = MockAdapter::new(dimensions, 7).with_ocean().with_land(8..16, 4..12);
//! let mut context = MapContext::new(dimensions, Box::new(adapter), MapGenConfig::default());
//!
//! let overlay = context.tag_strategic_corridors(CorridorStage::PreIslands).unwrap();
//! assert_eq!(overlay.key, "corridors");
//! ```

pub mod adapter;
pub mod corridors;
pub mod error;
pub mod foundation;
pub mod grid;
pub mod map_context;
pub mod map_parameters;
pub mod story;
pub mod viz;

pub use adapter::{EngineAdapter, MockAdapter};
pub use corridors::CorridorStage;
pub use error::{MapGenError, Result};
pub use foundation::{FoundationContext, FoundationOptions, WorldModel};
pub use map_context::MapContext;
pub use map_parameters::MapGenConfig;
pub use story::{StoryKey, StoryOverlaySnapshot, StoryTag, StoryTags};
