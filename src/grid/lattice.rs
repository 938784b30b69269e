//! Lattice lines: the four straight-line families the corridor scanner walks across the grid.

use bitflags::bitflags;
use enum_map::Enum;
use glam::{DVec2, IVec2};

use crate::grid::{Dimensions, OffsetCoordinate};

/// One of the four orientation families of straight lines on the square lattice.
///
/// ```txt
/// Column        x = c          (runs from the first row to the last)
/// Row           y = r          (runs from the first column to the last)
/// DiagonalSum   x + y = k      (runs toward increasing x, decreasing y)
/// DiagonalDiff  x - y = d      (runs toward increasing x, increasing y)
/// ```
#[derive(Enum, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LineOrientation {
    Column,
    Row,
    DiagonalSum,
    DiagonalDiff,
}

impl LineOrientation {
    pub const ALL: [Self; 4] = [
        LineOrientation::Column,
        LineOrientation::Row,
        LineOrientation::DiagonalSum,
        LineOrientation::DiagonalDiff,
    ];

    /// The bitflag that selects this family in a [`LineFamilies`] set.
    pub const fn family(self) -> LineFamilies {
        match self {
            LineOrientation::Column => LineFamilies::COLUMN,
            LineOrientation::Row => LineFamilies::ROW,
            LineOrientation::DiagonalSum => LineFamilies::DIAGONAL_SUM,
            LineOrientation::DiagonalDiff => LineFamilies::DIAGONAL_DIFF,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            LineOrientation::DiagonalSum | LineOrientation::DiagonalDiff
        )
    }

    /// Inclusive range of line indices (`c`, `r`, `k` or `d`) that intersect the grid.
    pub fn index_range(self, dimensions: Dimensions) -> std::ops::RangeInclusive<i32> {
        let width = dimensions.width() as i32;
        let height = dimensions.height() as i32;
        match self {
            LineOrientation::Column => 0..=width - 1,
            LineOrientation::Row => 0..=height - 1,
            LineOrientation::DiagonalSum => 0..=(width - 1) + (height - 1),
            LineOrientation::DiagonalDiff => -(height - 1)..=width - 1,
        }
    }

    /// Step between consecutive tiles along a line of this family.
    pub const fn step(self) -> IVec2 {
        match self {
            LineOrientation::Column => IVec2::new(0, 1),
            LineOrientation::Row => IVec2::new(1, 0),
            LineOrientation::DiagonalSum => IVec2::new(1, -1),
            LineOrientation::DiagonalDiff => IVec2::new(1, 1),
        }
    }

    /// Step across a line of this family, used to probe how wide a channel is around a tile.
    pub const fn perpendicular_step(self) -> IVec2 {
        match self {
            LineOrientation::Column => IVec2::new(1, 0),
            LineOrientation::Row => IVec2::new(0, 1),
            LineOrientation::DiagonalSum => IVec2::new(1, 1),
            LineOrientation::DiagonalDiff => IVec2::new(1, -1),
        }
    }

    /// Unit direction vector of the line.
    pub fn direction(self) -> DVec2 {
        self.step().as_dvec2().normalize()
    }

    /// The part of line `index` that lies inside the grid.
    ///
    /// Lines that miss the grid entirely yield an empty span.
    pub fn span(self, index: i32, dimensions: Dimensions) -> LineSpan {
        let width = dimensions.width() as i32;
        let height = dimensions.height() as i32;
        let (origin, len) = match self {
            LineOrientation::Column if (0..width).contains(&index) => {
                (OffsetCoordinate::new(index, 0), height)
            }
            LineOrientation::Row if (0..height).contains(&index) => {
                (OffsetCoordinate::new(0, index), width)
            }
            LineOrientation::DiagonalSum => {
                let x_start = 0.max(index - (height - 1));
                let x_end = (width - 1).min(index);
                (OffsetCoordinate::new(x_start, index - x_start), x_end - x_start + 1)
            }
            LineOrientation::DiagonalDiff => {
                let y_start = 0.max(-index);
                let y_end = (height - 1).min(width - 1 - index);
                (OffsetCoordinate::new(index + y_start, y_start), y_end - y_start + 1)
            }
            _ => (OffsetCoordinate::new(0, 0), 0),
        };

        LineSpan {
            orientation: self,
            index,
            origin,
            len: len.max(0) as usize,
        }
    }
}

/// The clipped part of a lattice line, from its first in-bounds tile to its last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSpan {
    pub orientation: LineOrientation,
    pub index: i32,
    origin: OffsetCoordinate,
    len: usize,
}

impl LineSpan {
    /// Number of tiles on the line inside the grid. This is the "theoretical span" a run is measured against.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Tile at ordinal `position` along the span.
    pub fn tile(&self, position: usize) -> OffsetCoordinate {
        debug_assert!(position < self.len);
        OffsetCoordinate(self.origin.0 + self.orientation.step() * position as i32)
    }

    /// Iterates over the tiles of the span in order.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn tiles(&self) -> impl Iterator<Item = OffsetCoordinate> + use<> {
        let span = *self;
        (0..span.len).map(move |position| span.tile(position))
    }

    /// Iterates over the tiles covered by `run`, a run found along this span.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn run_tiles(&self, run: Run) -> impl Iterator<Item = OffsetCoordinate> + use<> {
        let span = *self;
        (run.start..=run.end)
            .filter(move |&position| position < span.len)
            .map(move |position| span.tile(position))
    }
}

bitflags! {
    /// A set of [`LineOrientation`] families to scan.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LineFamilies: u8 {
        const COLUMN = 0b0001;
        const ROW = 0b0010;
        const DIAGONAL_SUM = 0b0100;
        const DIAGONAL_DIFF = 0b1000;
        const AXES = Self::COLUMN.bits() | Self::ROW.bits();
        const DIAGONALS = Self::DIAGONAL_SUM.bits() | Self::DIAGONAL_DIFF.bits();
    }
}

impl LineFamilies {
    /// Iterates over the orientations in the set, in [`LineOrientation::ALL`] order.
    pub fn orientations(self) -> impl Iterator<Item = LineOrientation> {
        LineOrientation::ALL
            .into_iter()
            .filter(move |orientation| self.contains(orientation.family()))
    }
}

/// A contiguous run of positions, `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

/// Finds the longest contiguous run of `true` values.
///
/// When several runs share the maximum length the first one wins. Returns `None` if no value is `true`.
///
/// # Examples
///
/// ```
/// use mapgen_core::grid::{longest_run, Run};
///
/// let water = [false, true, true, false, true, true, true, false];
/// assert_eq!(longest_run(water), Some(Run { start: 4, end: 6, len: 3 }));
/// ```
pub fn longest_run<I>(values: I) -> Option<Run>
where
    I: IntoIterator<Item = bool>,
{
    let mut best: Option<Run> = None;
    let mut current_start = 0;
    let mut current_len = 0;

    for (position, value) in values.into_iter().enumerate() {
        if !value {
            current_len = 0;
            continue;
        }
        if current_len == 0 {
            current_start = position;
        }
        current_len += 1;
        if best.is_none_or(|run| current_len > run.len) {
            best = Some(Run {
                start: current_start,
                end: position,
                len: current_len,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::{LineFamilies, LineOrientation, Run, longest_run};
    use crate::grid::{Dimensions, OffsetCoordinate};

    #[test]
    fn longest_run_picks_second_run() {
        let column = [false, true, true, false, true, true, true, false];
        assert_eq!(
            longest_run(column),
            Some(Run {
                start: 4,
                end: 6,
                len: 3
            })
        );
    }

    #[test]
    fn longest_run_of_all_false_is_none() {
        assert_eq!(longest_run([false; 5]), None);
        assert_eq!(longest_run(std::iter::empty()), None);
    }

    #[test]
    fn equal_runs_keep_the_first() {
        let values = [true, true, false, true, true];
        assert_eq!(longest_run(values).map(|run| run.start), Some(0));
    }

    #[test]
    fn diagonal_spans_are_clipped() {
        let dimensions = Dimensions::new(4, 3).unwrap();

        let sum = LineOrientation::DiagonalSum.span(3, dimensions);
        let tiles: Vec<_> = sum.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                OffsetCoordinate::new(1, 2),
                OffsetCoordinate::new(2, 1),
                OffsetCoordinate::new(3, 0)
            ]
        );

        let diff = LineOrientation::DiagonalDiff.span(-1, dimensions);
        let tiles: Vec<_> = diff.tiles().collect();
        assert_eq!(
            tiles,
            vec![OffsetCoordinate::new(0, 1), OffsetCoordinate::new(1, 2)]
        );
    }

    #[test]
    fn every_diagonal_in_range_is_non_empty() {
        let dimensions = Dimensions::new(6, 4).unwrap();
        for orientation in LineOrientation::ALL {
            for index in orientation.index_range(dimensions) {
                let span = orientation.span(index, dimensions);
                assert!(!span.is_empty(), "{orientation:?} {index}");
                assert!(
                    span.tiles()
                        .all(|tile| dimensions.in_bounds(tile.x(), tile.y()))
                );
            }
        }
    }

    #[test]
    fn out_of_range_axis_line_is_empty() {
        let dimensions = Dimensions::new(4, 3).unwrap();
        assert!(LineOrientation::Column.span(4, dimensions).is_empty());
        assert!(LineOrientation::Row.span(-1, dimensions).is_empty());
    }

    #[test]
    fn axes_flag_selects_columns_and_rows() {
        let orientations: Vec<_> = LineFamilies::AXES.orientations().collect();
        assert_eq!(
            orientations,
            vec![LineOrientation::Column, LineOrientation::Row]
        );
    }
}
