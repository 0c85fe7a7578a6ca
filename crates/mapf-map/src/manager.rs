//! Passage predicate over a map, static or direction-alternating.
//!
//! # Alternating rule
//!
//! With `direction_change_frequency = f > 0`, every passage flips direction
//! every `f` ticks, checkerboarded between adjacent rows/columns so that
//! neighbouring corridors always run in opposite directions.  For an edge in
//! the edge set, let
//!
//! ```text
//! period = t/f  +  min_axis/f  +  cross_axis  +  positive_flag
//! ```
//!
//! where `min_axis` is the smaller coordinate along the edge's axis,
//! `cross_axis` is the coordinate across it (the row of a horizontal edge,
//! the column of a vertical one), and `positive_flag` is 1 iff the edge
//! points east/south.  Horizontal edges are passable on odd periods,
//! vertical edges on even ones.
//!
//! `f = 0` degrades to plain edge-set membership.

use mapf_core::{GridEdge, TimedEdge};

use crate::GridMap;

/// Borrowing view of a map plus the direction-change frequency.  Cheap to
/// copy; planners pass it by value.
#[derive(Copy, Clone, Debug)]
pub struct MapManager<'m> {
    map: &'m GridMap,
    frequency: u32,
}

impl<'m> MapManager<'m> {
    pub fn new(map: &'m GridMap, frequency: u32) -> Self {
        Self { map, frequency }
    }

    pub fn map(&self) -> &'m GridMap {
        self.map
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// `true` if the alternating rule is active.
    pub fn is_dynamic(&self) -> bool {
        self.frequency > 0
    }

    /// May `edge.edge` be traversed departing at tick `edge.time`?
    ///
    /// Pure; fails only via return value.  Waits are not edges — callers
    /// handle `from == to` themselves (it is never in the edge set).
    pub fn passage_permitted(&self, edge: TimedEdge) -> bool {
        self.permitted(edge.edge, edge.time)
    }

    /// As [`passage_permitted`](Self::passage_permitted) with the pair split.
    pub fn permitted(&self, edge: GridEdge, t: u32) -> bool {
        if !self.map.has_edge(edge) {
            return false;
        }
        let f = self.frequency;
        if f == 0 {
            return true;
        }

        let timeframe = (t / f) as i64;
        let positive = edge.is_positive() as i64;
        if edge.is_horizontal() {
            let section = (edge.from.x.min(edge.to.x) as i64) / f as i64;
            let period = timeframe + section + edge.from.y as i64 + positive;
            period % 2 == 1
        } else {
            let section = (edge.from.y.min(edge.to.y) as i64) / f as i64;
            let period = timeframe + section + edge.from.x as i64 + positive;
            period % 2 == 0
        }
    }
}
