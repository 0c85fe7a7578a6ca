//! `mapf-search` — the shared search engines every planner drives.
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`timed`]       | space-time A* with waiting, horizon, and deadline    |
//! | [`untimed`]     | plain 4-connected grid A*                            |
//! | [`alternating`] | modulo-`2f` phase search for alternating maps        |
//!
//! The engines know nothing about reservations, constraints, or maps:
//! callers inject a *legality* closure `(from, to, depart_tick) → bool`, a
//! heuristic, and (for the timed engine) an acceptance predicate.  A
//! heuristic value of `u32::MAX` means "unreachable" and prunes the
//! successor.
//!
//! All three engines break f-score ties lexicographically on
//! `(time, x, y)`, so results are deterministic for any fixed legality
//! predicate.

pub mod alternating;
pub mod timed;
pub mod untimed;

#[cfg(test)]
mod tests;

use mapf_core::Plan;

// ── SearchOutcome ─────────────────────────────────────────────────────────────

/// Why a search ended.  Timeouts are *not* an outcome — they surface as
/// `Err(MapfError::Timeout)` so callers cannot mistake them for a dead end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Goal accepted; the reconstructed plan.
    Found(Plan),
    /// The open set ran dry with the horizon untouched: no path exists.
    Exhausted,
    /// Every remaining node lay past the time horizon.  Unsolvable for this
    /// attempt; a caller with a trial budget may retry differently.
    HorizonExceeded,
}

impl SearchOutcome {
    /// The plan, if the search succeeded.
    pub fn into_plan(self) -> Option<Plan> {
        match self {
            SearchOutcome::Found(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use alternating::alternating_astar;
pub use timed::timed_astar;
pub use untimed::grid_astar;
