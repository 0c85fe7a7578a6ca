//! CBS constraints: prohibitions attached to a single traversal.
//!
//! Constraint sets are cloned into child constraint-tree nodes; they are
//! value types with no shared mutable state.

use rustc_hash::FxHashSet;

use mapf_core::{Position, TimedEdge, TimedPosition, TraversalId};

/// Forbids one traversal from occupying a cell at a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexConstraint {
    pub traversal: TraversalId,
    pub at: TimedPosition,
}

/// Forbids one traversal from using an edge (either direction) at a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeConstraint {
    pub traversal: TraversalId,
    pub at: TimedEdge,
}

/// A node's accumulated vertex and edge prohibitions.
#[derive(Clone, Default, Debug)]
pub struct ConstraintSet {
    vertices: FxHashSet<VertexConstraint>,
    edges: FxHashSet<EdgeConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vertex(&mut self, constraint: VertexConstraint) {
        self.vertices.insert(constraint);
    }

    pub fn insert_edge(&mut self, constraint: EdgeConstraint) {
        self.edges.insert(constraint);
    }

    pub fn len(&self) -> usize {
        self.vertices.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Is `traversal` forbidden from occupying `at`?
    pub fn forbids_cell(&self, traversal: TraversalId, at: TimedPosition) -> bool {
        self.vertices.contains(&VertexConstraint { traversal, at })
    }

    /// Is `traversal` forbidden from occupying `pos` at any tick strictly
    /// after `t`?  Used when a goal-region traversal wants to rest on its
    /// target forever.
    pub fn forbids_cell_after(&self, traversal: TraversalId, pos: Position, t: u32) -> bool {
        self.vertices
            .iter()
            .any(|c| c.traversal == traversal && c.at.pos == pos && c.at.time > t)
    }

    /// Is `traversal` forbidden from using `at` — in either direction — at
    /// its tick?
    pub fn forbids_edge(&self, traversal: TraversalId, at: TimedEdge) -> bool {
        self.edges.contains(&EdgeConstraint { traversal, at })
            || self.edges.contains(&EdgeConstraint { traversal, at: at.reversed() })
    }
}
