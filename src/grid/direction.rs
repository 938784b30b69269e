use glam::IVec2;

/// The eight compass directions of a square tile.
///
/// `y` grows from row to row, so [`Direction::North`] is `(0, -1)` and [`Direction::South`] is `(0, 1)`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order, starting from [`Direction::North`].
    pub const ALL: [Self; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four axis-aligned directions, in [`Direction::ALL`] order.
    pub const ORTHOGONAL: [Self; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the opposite direction of the current direction.
    pub const fn opposite_direction(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Unit step of this direction in offset coordinates.
    pub const fn offset(self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::NorthEast => IVec2::new(1, -1),
            Direction::East => IVec2::new(1, 0),
            Direction::SouthEast => IVec2::new(1, 1),
            Direction::South => IVec2::new(0, 1),
            Direction::SouthWest => IVec2::new(-1, 1),
            Direction::West => IVec2::new(-1, 0),
            Direction::NorthWest => IVec2::new(-1, -1),
        }
    }
}
