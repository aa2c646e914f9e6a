//! Block positions and six-way adjacency.
//!
//! Every registry in the engine is keyed by [`BlockPos`]. Fractional world
//! coordinates are floored onto the block grid, so two inputs address the
//! same block exactly when their floored coordinates match. The canonical
//! text form is `"x,y,z"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between the coordinates of a position key.
pub const KEY_DELIMITER: char = ',';

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing a position key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionKeyError {
    #[error("position key '{0}' must have exactly three components")]
    WrongArity(String),
    #[error("invalid coordinate '{component}' in position key '{key}'")]
    InvalidCoordinate { key: String, component: String },
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The six axis-aligned directions, named after the world axes
/// (+X east, +Y up, +Z south).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    Up,
    Down,
    South,
    North,
}

impl Direction {
    /// All six directions in enumeration order: +X, -X, +Y, -Y, +Z, -Z.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
        Direction::South,
        Direction::North,
    ];

    /// Unit offset for this direction.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::South => (0, 0, 1),
            Direction::North => (0, 0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }
}

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Snap fractional world coordinates onto the block grid (toward
    /// negative infinity, so `-0.5` lands in block `-1`).
    ///
    /// Coordinates outside the `i32` range clamp to its ends and NaN maps
    /// to `0`.
    pub fn from_world(x: f64, y: f64, z: f64) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    /// The neighbouring block in `direction`. Wraps at the `i32` edges of
    /// the grid.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.offset();
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// The six face-adjacent blocks in [`Direction::ALL`] order.
    pub fn neighbors(self) -> [BlockPos; 6] {
        Direction::ALL.map(|d| self.offset(d))
    }

    /// Direction from `self` to a face-adjacent `other`, if they touch.
    pub fn direction_to(self, other: BlockPos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| self.offset(d) == other)
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &BlockPos) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
            .saturating_add(self.z.abs_diff(other.z))
    }

    /// Canonical string key, e.g. `"3,-1,12"`.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`BlockPos::key`].
    pub fn parse_key(key: &str) -> Result<Self, PositionKeyError> {
        key.parse()
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.x, self.y, self.z
        )
    }
}

impl FromStr for BlockPos {
    type Err = PositionKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split(KEY_DELIMITER).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(PositionKeyError::WrongArity(key.to_string()));
        };
        let coord = |component: &str| {
            component
                .trim()
                .parse::<i32>()
                .map_err(|_| PositionKeyError::InvalidCoordinate {
                    key: key.to_string(),
                    component: component.to_string(),
                })
        };
        Ok(Self::new(coord(*x)?, coord(*y)?, coord(*z)?))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
