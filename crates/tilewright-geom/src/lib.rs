//! Map coordinates, floors, and compass directions (no map storage here).
#![forbid(unsafe_code)]

use core::fmt;
use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Number of vertical levels a map holds.
pub const MAP_LAYERS: i32 = 16;
/// Highest aboveground floor; floors below it (larger z) are underground.
pub const GROUND_LAYER: i32 = 7;
/// Pixel size of one tile on screen; used for floor parallax offsets.
pub const TILE_PIXELS: i32 = 32;
/// Largest magnitude an x or y coordinate may have on a map.
pub const MAP_MAX_COORD: i32 = 1 << 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// True when the floor lies inside `0..MAP_LAYERS` and x/y within
    /// `MAP_MAX_COORD` of the origin.
    #[inline]
    pub fn is_valid(self) -> bool {
        (0..MAP_LAYERS).contains(&self.z)
            && (-MAP_MAX_COORD..=MAP_MAX_COORD).contains(&self.x)
            && (-MAP_MAX_COORD..=MAP_MAX_COORD).contains(&self.y)
    }

    #[inline]
    pub fn band(self) -> Band {
        Band::of_floor(self.z)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z,
        }
    }

    #[inline]
    pub fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    /// The 3x3 block centered on this position, row-major from the north-west.
    pub fn neighborhood(self) -> impl Iterator<Item = Position> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| self.offset(dx, dy)))
    }

    /// Chebyshev distance on the floor plane.
    #[inline]
    pub fn plane_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for Position {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl Add<(i32, i32)> for Position {
    type Output = Position;
    #[inline]
    fn add(self, rhs: (i32, i32)) -> Position {
        self.offset(rhs.0, rhs.1)
    }
}

impl Sub for Position {
    type Output = (i32, i32);
    #[inline]
    fn sub(self, rhs: Position) -> (i32, i32) {
        (self.x - rhs.x, self.y - rhs.y)
    }
}

/// Vertical band a floor belongs to. Networked sessions fetch leaves per band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Aboveground,
    Underground,
}

impl Band {
    pub const ALL: [Band; 2] = [Band::Aboveground, Band::Underground];

    #[inline]
    pub fn of_floor(z: i32) -> Band {
        if z > GROUND_LAYER {
            Band::Underground
        } else {
            Band::Aboveground
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inclusive floor range covered by the band.
    #[inline]
    pub fn floors(self) -> core::ops::RangeInclusive<i32> {
        match self {
            Band::Aboveground => 0..=GROUND_LAYER,
            Band::Underground => (GROUND_LAYER + 1)..=(MAP_LAYERS - 1),
        }
    }
}

/// Screen offset applied when drawing floors above ground level.
#[inline]
pub fn floor_adjustment(z: i32) -> i32 {
    if z > GROUND_LAYER {
        0
    } else {
        TILE_PIXELS * (GROUND_LAYER - z)
    }
}

/// The eight compass neighbors. North is `y - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    /// Clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];
    pub const STRAIGHT: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn bit(self) -> u8 {
        1u8 << (self as u8)
    }

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 4) % 8]
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        (self as u8) % 2 == 1
    }

    /// The two straight directions flanking a diagonal, e.g. NE -> (N, E).
    /// Straight directions return themselves twice.
    #[inline]
    pub fn flanks(self) -> (Direction, Direction) {
        if self.is_diagonal() {
            (
                Direction::ALL[(self.index() + 7) % 8],
                Direction::ALL[(self.index() + 1) % 8],
            )
        } else {
            (self, self)
        }
    }
}
