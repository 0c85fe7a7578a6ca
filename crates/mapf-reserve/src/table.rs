//! Space-time reservation table.
//!
//! # Indices
//!
//! Every reservation lives in the primary index of its kind *and* in the
//! per-agent rollback index; cell reservations additionally register their
//! tick in a per-cell ordered set, which answers the "anything later than
//! `t`?" range queries behind [`resting_allowed`](ReservationTable::resting_allowed)
//! and [`is_free_forever`](ReservationTable::is_free_forever) in O(log n).
//! [`cancel_agent`](ReservationTable::cancel_agent) restores all indices.
//!
//! A permanent-from reservation at `t` claims its cell from `t` onward
//! forever.  It does not retroactively affect queries at earlier ticks.

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use rustc_hash::FxHashMap;

use mapf_core::{AgentId, Position, TimedEdge, TimedPosition};

/// One committed space-time claim, as recorded in the rollback index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reservation {
    /// Cell occupied for exactly one tick.
    Cell(TimedPosition),
    /// Directed edge occupied between `time` and `time + 1`.
    Edge(TimedEdge),
    /// Cell occupied from `from` onward forever.
    PermanentFrom { pos: Position, from: u32 },
}

/// The reservation substrate shared by CA* and Token-Passing.
#[derive(Default, Debug)]
pub struct ReservationTable {
    cells: FxHashMap<TimedPosition, AgentId>,
    edges: FxHashMap<TimedEdge, AgentId>,
    permanent: FxHashMap<Position, (u32, AgentId)>,
    by_agent: FxHashMap<AgentId, Vec<Reservation>>,
    cell_ticks: FxHashMap<Position, BTreeSet<u32>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// No cell claim at `(pos, t)` and no permanent claim starting at or
    /// before `t`.
    pub fn is_cell_free(&self, pos: Position, t: u32) -> bool {
        if self.cells.contains_key(&pos.at(t)) {
            return false;
        }
        match self.permanent.get(&pos) {
            Some(&(from, _)) => from > t,
            None => true,
        }
    }

    /// Free at `t` and at every later tick — required before an agent may
    /// end its plan (and rest) on `pos`.
    pub fn is_free_forever(&self, pos: Position, t: u32) -> bool {
        self.is_cell_free(pos, t) && self.resting_allowed(pos, t)
    }

    /// No cell claim on `pos` at any tick strictly after `t`.  A permanent
    /// claim always covers later ticks, so its presence denies resting.
    pub fn resting_allowed(&self, pos: Position, t: u32) -> bool {
        if self.permanent.contains_key(&pos) {
            return false;
        }
        match self.cell_ticks.get(&pos) {
            Some(ticks) => ticks.range((Excluded(t), Unbounded)).next().is_none(),
            None => true,
        }
    }

    /// Neither `(from → to, t)` nor its swap partner `(to → from, t)` is
    /// claimed.
    pub fn is_edge_free(&self, from: Position, to: Position, t: u32) -> bool {
        let edge = from.to(to).at(t);
        !self.edges.contains_key(&edge) && !self.edges.contains_key(&edge.reversed())
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Claim `(pos, t)` for `agent`; with `permanent`, claim from `t` onward.
    pub fn reserve_cell(&mut self, agent: AgentId, pos: Position, t: u32, permanent: bool) {
        if permanent {
            self.apply(agent, Reservation::PermanentFrom { pos, from: t });
        } else {
            self.apply(agent, Reservation::Cell(pos.at(t)));
        }
    }

    /// Claim the directed edge `(from → to)` departing at `t` for `agent`.
    pub fn reserve_edge(&mut self, agent: AgentId, from: Position, to: Position, t: u32) {
        self.apply(agent, Reservation::Edge(from.to(to).at(t)));
    }

    /// Reserve a reconstructed path: every step's cell at its tick and every
    /// move's edge at its departure tick.
    ///
    /// `skip_first` drops the junction step a leg shares with its
    /// predecessor (already reserved); with `permanent_end` the final cell
    /// becomes a permanent-from claim instead of a single-tick one.
    pub fn reserve_path(
        &mut self,
        agent: AgentId,
        steps: &[TimedPosition],
        skip_first: bool,
        permanent_end: bool,
    ) {
        for (i, step) in steps.iter().enumerate() {
            let is_last = i + 1 == steps.len();
            if is_last && permanent_end {
                self.reserve_cell(agent, step.pos, step.time, true);
            } else if i > 0 || !skip_first {
                self.reserve_cell(agent, step.pos, step.time, false);
            }
            if !is_last {
                let next = steps[i + 1];
                if next.pos != step.pos {
                    self.reserve_edge(agent, step.pos, next.pos, step.time);
                }
            }
        }
    }

    /// Remove every reservation recorded under `agent` from all indices.
    pub fn cancel_agent(&mut self, agent: AgentId) {
        let Some(reservations) = self.by_agent.remove(&agent) else { return };
        for reservation in reservations {
            match reservation {
                Reservation::Cell(tp) => {
                    self.cells.remove(&tp);
                    if let Some(ticks) = self.cell_ticks.get_mut(&tp.pos) {
                        ticks.remove(&tp.time);
                        if ticks.is_empty() {
                            self.cell_ticks.remove(&tp.pos);
                        }
                    }
                }
                Reservation::Edge(te) => {
                    self.edges.remove(&te);
                }
                Reservation::PermanentFrom { pos, .. } => {
                    self.permanent.remove(&pos);
                }
            }
        }
    }

    /// Snapshot of `agent`'s reservations, for attempt-scoped rollback:
    /// snapshot, [`cancel_agent`](Self::cancel_agent), try, and on failure
    /// [`restore`](Self::restore) the snapshot.
    pub fn reservations_of(&self, agent: AgentId) -> Vec<Reservation> {
        self.by_agent.get(&agent).cloned().unwrap_or_default()
    }

    /// Re-apply a snapshot taken with [`reservations_of`](Self::reservations_of).
    pub fn restore(&mut self, agent: AgentId, reservations: Vec<Reservation>) {
        for reservation in reservations {
            self.apply(agent, reservation);
        }
    }

    fn apply(&mut self, agent: AgentId, reservation: Reservation) {
        match reservation {
            Reservation::Cell(tp) => {
                debug_assert!(
                    !self.cells.get(&tp).is_some_and(|&owner| owner != agent),
                    "cell {tp} already reserved by another agent"
                );
                self.cells.insert(tp, agent);
                self.cell_ticks.entry(tp.pos).or_default().insert(tp.time);
            }
            Reservation::Edge(te) => {
                debug_assert!(
                    !self.edges.get(&te).is_some_and(|&owner| owner != agent),
                    "edge {te} already reserved by another agent"
                );
                self.edges.insert(te, agent);
            }
            Reservation::PermanentFrom { pos, from } => {
                debug_assert!(
                    !self.permanent.get(&pos).is_some_and(|&(_, owner)| owner != agent),
                    "cell {pos} already permanently reserved by another agent"
                );
                self.permanent.insert(pos, (from, agent));
            }
        }
        self.by_agent.entry(agent).or_default().push(reservation);
    }
}
