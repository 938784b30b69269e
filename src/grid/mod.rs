//! Pure coordinate utilities for the rectangular tile grid.
//!
//! Nothing in this module touches the terrain authority: it only knows how wide and tall the map is,
//! how `(x, y)` maps to a linear index, and how to walk the grid along neighbourhoods and lattice lines.

mod direction;
mod lattice;
mod offset_coordinate;

use arrayvec::ArrayVec;

pub use direction::Direction;
pub use lattice::{LineFamilies, LineOrientation, LineSpan, Run, longest_run};
pub use offset_coordinate::OffsetCoordinate;

use crate::error::{MapGenError, Result};

/// Width and height of the map in tiles.
///
/// Both extents are strictly positive, so `size()` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates new dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::InvalidDimensions`] when either extent is `0`.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapGenError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles in the grid, `width * height`.
    #[inline]
    pub const fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if `(x, y)` lies inside the grid.
    #[inline]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Linear index of `(x, y)`, row-major. Returns `None` when the coordinate is out of bounds.
    #[inline]
    pub const fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Dimensions::index`].
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `index >= self.size()`.
    #[inline]
    pub fn coordinate(&self, index: usize) -> OffsetCoordinate {
        debug_assert!(index < self.size(), "tile index {index} is out of bounds");
        let width = self.width as usize;
        OffsetCoordinate::new((index % width) as i32, (index / width) as i32)
    }

    /// Iterates over every coordinate of the grid in row-major order.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn all_coordinates(&self) -> impl Iterator<Item = OffsetCoordinate> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| OffsetCoordinate::new(x, y)))
    }

    /// Returns the in-bounds tiles of the 8-neighbourhood of `coordinate`, following [`Direction::ALL`] order.
    pub fn neighbors8(&self, coordinate: OffsetCoordinate) -> ArrayVec<OffsetCoordinate, 8> {
        Direction::ALL
            .into_iter()
            .map(|direction| coordinate.neighbor(direction))
            .filter(|neighbor| self.in_bounds(neighbor.x(), neighbor.y()))
            .collect()
    }

    /// Returns the in-bounds tiles of the square window of the given `radius` around `coordinate`.
    ///
    /// The window is `(2 * radius + 1)^2` tiles before clipping, and includes `coordinate` itself.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn tiles_in_window(
        &self,
        coordinate: OffsetCoordinate,
        radius: u32,
    ) -> impl Iterator<Item = OffsetCoordinate> + use<> {
        let dimensions = *self;
        let radius = radius as i32;
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| (dx, dy)))
            .map(move |(dx, dy)| OffsetCoordinate::new(coordinate.x() + dx, coordinate.y() + dy))
            .filter(move |tile| dimensions.in_bounds(tile.x(), tile.y()))
    }
}
