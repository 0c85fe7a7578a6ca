//! Tentative one-tick claims used by the runtime replanner's backtracking
//! step.  Unlike [`crate::ReservationTable`] claims, these never outlive a
//! tick: the container is cleared before every deconfliction round.

use rustc_hash::FxHashMap;

use mapf_core::{AgentId, Position};

/// An *undirected* edge claim: equality is commutative on the endpoints, so
/// claiming a passage in one direction blocks the swap in the other.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClaimEdge {
    a: Position,
    b: Position,
}

impl ClaimEdge {
    /// Normalises the endpoint order, making `new(p, q) == new(q, p)`.
    pub fn new(p: Position, q: Position) -> Self {
        if p <= q { Self { a: p, b: q } } else { Self { a: q, b: p } }
    }
}

/// What one agent holds for the tick: the cell it wants at `t + 1` and, for
/// a move, the passage it uses to get there.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct AgentClaim {
    target: Position,
    edge: Option<ClaimEdge>,
}

/// Per-tick claim bookkeeping: at most one target cell and one edge per
/// agent, no two agents on the same target, no two agents on the same
/// undirected edge.
#[derive(Default, Debug)]
pub struct ClaimContainer {
    positions: FxHashMap<Position, AgentId>,
    edges: FxHashMap<ClaimEdge, AgentId>,
    by_agent: FxHashMap<AgentId, AgentClaim>,
}

impl ClaimContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the step `from → to` (or a wait when `from == to`).
    ///
    /// All-or-nothing: returns `false` and records nothing if the target
    /// cell or the passage is already claimed by another agent.  An agent
    /// must release its previous claim before placing a new one.
    pub fn try_claim(&mut self, agent: AgentId, from: Position, to: Position) -> bool {
        debug_assert!(!self.by_agent.contains_key(&agent), "agent already holds a claim");
        if self.positions.contains_key(&to) {
            return false;
        }
        let edge = (from != to).then(|| ClaimEdge::new(from, to));
        if let Some(edge) = edge {
            if self.edges.contains_key(&edge) {
                return false;
            }
            self.edges.insert(edge, agent);
        }
        self.positions.insert(to, agent);
        self.by_agent.insert(agent, AgentClaim { target: to, edge });
        true
    }

    /// Release whatever `agent` holds.
    pub fn remove_claims(&mut self, agent: AgentId) {
        let Some(claim) = self.by_agent.remove(&agent) else { return };
        self.positions.remove(&claim.target);
        if let Some(edge) = claim.edge {
            self.edges.remove(&edge);
        }
    }

    /// The cell `agent` has claimed for `t + 1`, if any.
    pub fn target_of(&self, agent: AgentId) -> Option<Position> {
        self.by_agent.get(&agent).map(|c| c.target)
    }

    pub fn is_position_claimed(&self, pos: Position) -> bool {
        self.positions.contains_key(&pos)
    }

    pub fn is_edge_claimed(&self, from: Position, to: Position) -> bool {
        from != to && self.edges.contains_key(&ClaimEdge::new(from, to))
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.edges.clear();
        self.by_agent.clear();
    }
}
