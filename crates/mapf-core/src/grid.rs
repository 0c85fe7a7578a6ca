//! Grid value types: cells, directed edges, and their time-stamped forms.
//!
//! All four types are small `Copy` values with structural equality and
//! hashing, so they can be used directly as keys in reservation and
//! constraint indices.  Coordinates are `i32` so neighbour arithmetic never
//! wraps at the map border; maps themselves only contain non-negative cells.

use std::fmt;

// ── Position ──────────────────────────────────────────────────────────────────

/// A grid cell `(x, y)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    #[inline]
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours in a fixed order: east, west, south,
    /// north.  The order is part of the deterministic tie-breaking contract
    /// of the search engines.
    #[inline]
    pub fn neighbours(self) -> [Position; 4] {
        [
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
        ]
    }

    /// Attach a time stamp.
    #[inline]
    pub fn at(self, time: u32) -> TimedPosition {
        TimedPosition { pos: self, time }
    }

    /// Directed edge from `self` to `to`.
    #[inline]
    pub fn to(self, to: Position) -> GridEdge {
        GridEdge { from: self, to }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── GridEdge ──────────────────────────────────────────────────────────────────

/// A directed passage between two cells.  The reverse edge is a distinct
/// value; use [`GridEdge::reversed`] to obtain it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridEdge {
    pub from: Position,
    pub to: Position,
}

impl GridEdge {
    #[inline]
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// The same passage in the opposite direction.
    #[inline]
    pub fn reversed(self) -> GridEdge {
        GridEdge { from: self.to, to: self.from }
    }

    /// `true` if source and target are the same cell (a wait, not a passage).
    #[inline]
    pub fn is_wait(self) -> bool {
        self.from == self.to
    }

    /// `true` if the edge runs along the x axis.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        self.from.y == self.to.y && self.from.x != self.to.x
    }

    /// `true` if the edge points in the canonical positive direction of its
    /// axis (east for horizontal, south for vertical).
    #[inline]
    pub fn is_positive(self) -> bool {
        self.to.x > self.from.x || self.to.y > self.from.y
    }

    /// Attach a departure time stamp.
    #[inline]
    pub fn at(self, time: u32) -> TimedEdge {
        TimedEdge { edge: self, time }
    }
}

impl fmt::Display for GridEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.from, self.to)
    }
}

// ── Timed forms ───────────────────────────────────────────────────────────────

/// A cell occupied at a specific tick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedPosition {
    pub pos: Position,
    pub time: u32,
}

impl TimedPosition {
    #[inline]
    pub fn new(pos: Position, time: u32) -> Self {
        Self { pos, time }
    }
}

impl fmt::Display for TimedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pos, self.time)
    }
}

/// A directed edge traversed between tick `time` and `time + 1`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedEdge {
    pub edge: GridEdge,
    pub time: u32,
}

impl TimedEdge {
    #[inline]
    pub fn new(edge: GridEdge, time: u32) -> Self {
        Self { edge, time }
    }

    /// The reverse passage departing at the same tick (the swap partner).
    #[inline]
    pub fn reversed(self) -> TimedEdge {
        TimedEdge { edge: self.edge.reversed(), time: self.time }
    }
}

impl fmt::Display for TimedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.edge, self.time)
    }
}
