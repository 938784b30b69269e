//! Diagnostic renderings of the corridor tags: an ASCII map for logs and a grayscale mask for PNG dumps.

use std::path::Path;

use crate::{
    MapContext,
    error::{MapGenError, Result},
    grid::Dimensions,
    story::{CorridorKind, StoryKey},
};

/// Gray level of a corridor kind in [`corridor_mask`]. Tiles outside every corridor are `0`.
pub const fn corridor_gray(kind: CorridorKind) -> u8 {
    match kind {
        CorridorKind::Sea => 64,
        CorridorKind::IslandHop => 128,
        CorridorKind::Land => 192,
        CorridorKind::River => 255,
    }
}

const fn corridor_glyph(kind: CorridorKind) -> char {
    match kind {
        CorridorKind::Sea => 'S',
        CorridorKind::IslandHop => 'I',
        CorridorKind::Land => 'L',
        CorridorKind::River => 'R',
    }
}

/// One byte per tile in row-major order, coded by corridor kind.
pub fn corridor_mask(context: &MapContext) -> Vec<u8> {
    context
        .dimensions()
        .all_coordinates()
        .map(|tile| {
            context
                .story_tags
                .corridor_kind(StoryKey::from(tile))
                .map_or(0, corridor_gray)
        })
        .collect()
}

/// Renders the map one character per tile: the corridor kind's letter, `~` for other water and `.` for other land.
///
/// The first row printed is `y = 0`.
pub fn corridor_ascii(context: &MapContext) -> String {
    let dimensions = context.dimensions();
    let mut ascii = String::with_capacity(dimensions.size() + dimensions.height() as usize);
    for tile in dimensions.all_coordinates() {
        let glyph = match context.story_tags.corridor_kind(StoryKey::from(tile)) {
            Some(kind) => corridor_glyph(kind),
            None if context.adapter().is_water(tile.x(), tile.y()) => '~',
            None => '.',
        };
        ascii.push(glyph);
        if tile.x() == dimensions.width() as i32 - 1 {
            ascii.push('\n');
        }
    }
    ascii
}

/// Saves `pixels` as an 8-bit grayscale PNG, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`MapGenError::BufferSizeMismatch`] if `pixels` does not hold one byte per tile, and
/// [`MapGenError::Image`] if the file cannot be written.
pub fn write_grayscale_png(path: &Path, dimensions: Dimensions, pixels: &[u8]) -> Result<()> {
    if pixels.len() != dimensions.size() {
        return Err(MapGenError::BufferSizeMismatch {
            name: "pixels".to_owned(),
            expected: dimensions.size(),
            received: pixels.len(),
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(image::ImageError::IoError)?;
    }
    image::save_buffer(
        path,
        pixels,
        dimensions.width(),
        dimensions.height(),
        image::ColorType::L8,
    )?;
    tracing::debug!(target: "mapgen::viz", path = %path.display(), "viz.png_written");
    Ok(())
}
