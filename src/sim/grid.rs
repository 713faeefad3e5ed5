//! Grid headings and arena bounds
//!
//! Everything moves on an axis-aligned integer grid. A heading is one of the
//! four cardinal directions; turns are relative quarter turns.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::Cell;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Cardinal travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

/// Relative quarter turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Unit step for this heading (y grows downward)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Heading::North => IVec2::new(0, -1),
            Heading::East => IVec2::new(1, 0),
            Heading::South => IVec2::new(0, 1),
            Heading::West => IVec2::new(-1, 0),
        }
    }

    pub fn opposite(self) -> Heading {
        match self {
            Heading::North => Heading::South,
            Heading::East => Heading::West,
            Heading::South => Heading::North,
            Heading::West => Heading::East,
        }
    }

    pub fn is_opposite(self, other: Heading) -> bool {
        self.opposite() == other
    }

    /// Heading after a quarter turn
    pub fn turned(self, turn: Turn) -> Heading {
        match (self, turn) {
            (Heading::North, Turn::Left) => Heading::West,
            (Heading::North, Turn::Right) => Heading::East,
            (Heading::East, Turn::Left) => Heading::North,
            (Heading::East, Turn::Right) => Heading::South,
            (Heading::South, Turn::Left) => Heading::East,
            (Heading::South, Turn::Right) => Heading::West,
            (Heading::West, Turn::Left) => Heading::South,
            (Heading::West, Turn::Right) => Heading::North,
        }
    }

    /// Cell `n` steps ahead of `from`
    #[inline]
    pub fn advance(self, from: Cell, n: i32) -> Cell {
        from + self.delta() * n
    }
}

/// Rectangular arena, cells `[0, width) x [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Start cell and heading for slot `index` of `count` vehicles.
    ///
    /// Two vehicles face each other across the horizontal midline; the
    /// third and fourth come in from the top and bottom.
    pub fn spawn_point(&self, index: usize, count: usize) -> (Cell, Heading) {
        let (w, h) = (self.width, self.height);
        let mid_y = h / 2;
        match (index, count) {
            (0, 1) => (IVec2::new(w / 2, mid_y), Heading::East),
            (0, _) => (IVec2::new(w / 4, mid_y), Heading::East),
            (1, _) => (IVec2::new(w * 3 / 4, mid_y), Heading::West),
            (2, _) => (IVec2::new(w / 2, h / 4), Heading::South),
            (3, _) => (IVec2::new(w / 2, h * 3 / 4), Heading::North),
            // Extra slots line up along the top edge heading south
            (i, _) => (
                IVec2::new(((i as i32 - 3) * w / 8).clamp(1, w - 2), 2),
                Heading::South,
            ),
        }
    }
}
