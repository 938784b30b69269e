use glam::IVec2;

use crate::grid::direction::Direction;

/// A tile address in the offset coordinate system.
///
/// The origin `(0, 0)` is the first tile of the first row; `x` grows along a row and `y` grows from row to row.
/// Valid coordinates satisfy `x ∈ [0, width)` and `y ∈ [0, height)`, but intermediate values (a neighbor of an
/// edge tile, a point on a lattice line before clipping) may fall outside, so the components are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetCoordinate(pub IVec2);

impl OffsetCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    pub const fn x(&self) -> i32 {
        self.0.x
    }

    pub const fn y(&self) -> i32 {
        self.0.y
    }

    pub const fn into_inner(self) -> IVec2 {
        self.0
    }

    /// Returns the coordinate one step away in `direction`. The result is not bounds-checked.
    pub fn neighbor(self, direction: Direction) -> Self {
        Self(self.0 + direction.offset())
    }
}
