//! Planner selection, run parameters, and the cooperative deadline.

use std::time::{Duration, Instant};

use crate::{MapfError, MapfResult};

// ── Algorithm ────────────────────────────────────────────────────────────────

/// Which planner a run uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Sequential prioritized planning over a shared reservation table.
    CaStar,
    /// Online lifelong pickup-and-delivery scheduling.
    TokenPassing,
    /// Region partitioning with per-region conflict-based search.
    HierarchicalCbs,
    /// Per-tick claim-based deconfliction on a static map.
    RuntimeReplanner,
    /// Per-tick deconfliction on a direction-alternating map.
    AlternatingRuntimeReplanner,
    /// Decentralized greedy stepping with cycle rotation.
    TrafficSimulator,
}

// ── PlannerParams ────────────────────────────────────────────────────────────

/// Run parameters shared by every planner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerParams {
    pub algorithm: Algorithm,

    /// Latest tick any search may reach.  A search whose open set holds only
    /// nodes past the horizon fails for the current attempt.
    pub time_horizon: u32,

    /// How many shuffled orderings (CA*) or per-tick retry rounds (runtime
    /// replanner) to attempt before giving up.
    pub trial_limit: u32,

    /// `0` for a static map; `f > 0` flips edge directions every `f` ticks.
    pub direction_change_frequency: u32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::CaStar,
            time_horizon: 512,
            trial_limit: 32,
            direction_change_frequency: 0,
            seed: 42,
        }
    }
}

impl PlannerParams {
    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }
}

// ── Deadline ─────────────────────────────────────────────────────────────────

/// Cooperative cancellation: a single monotonic point in time polled at hot
/// points (every search expansion, outer tick, region scan, and
/// true-distance endpoint).  On breach, [`MapfError::Timeout`] propagates up
/// and the run's transient state is dropped by the caller.
#[derive(Copy, Clone, Debug, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline — checks always pass.
    pub const NONE: Deadline = Deadline(None);

    /// Deadline `budget` from now.
    pub fn within(budget: Duration) -> Self {
        Deadline(Some(Instant::now() + budget))
    }

    /// Deadline at an absolute instant.
    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    /// `Err(MapfError::Timeout)` once the deadline has passed.
    #[inline]
    pub fn check(&self) -> MapfResult<()> {
        match self.0 {
            Some(at) if Instant::now() >= at => Err(MapfError::Timeout),
            _ => Ok(()),
        }
    }
}
