//! The `Planner` seam and the algorithm dispatch.

use mapf_core::{Algorithm, Deadline, MapfResult, PlannerParams, Solution};
use mapf_hier::HierarchicalCbsPlanner;
use mapf_map::Scenario;
use mapf_planners::{CaStarPlanner, RuntimeReplanner, TokenPassingPlanner, TrafficSimulator};

/// Pluggable planning engine.
///
/// All planners are exclusive owners of their per-run state, so a single
/// planner value can be reused across runs and scenarios.
pub trait Planner {
    /// `Ok(None)` means the scenario is unsolvable for this planner — a
    /// result, not an error, and never retried by the engine.
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>>;
}

impl Planner for CaStarPlanner {
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        CaStarPlanner::solve(self, scenario, params, deadline)
    }
}

impl Planner for TokenPassingPlanner {
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        TokenPassingPlanner::solve(self, scenario, params, deadline)
    }
}

impl Planner for RuntimeReplanner {
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        RuntimeReplanner::solve(self, scenario, params, deadline)
    }
}

impl Planner for HierarchicalCbsPlanner {
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        HierarchicalCbsPlanner::solve(self, scenario, params, deadline)
    }
}

impl Planner for TrafficSimulator {
    fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        TrafficSimulator::solve(self, scenario, params, deadline)
    }
}

/// Run the planner selected by `params.algorithm`.
pub fn mapf(
    scenario: &Scenario,
    params: &PlannerParams,
    deadline: &Deadline,
) -> MapfResult<Option<Solution>> {
    match params.algorithm {
        Algorithm::CaStar => CaStarPlanner.solve(scenario, params, deadline),
        Algorithm::TokenPassing => TokenPassingPlanner.solve(scenario, params, deadline),
        Algorithm::HierarchicalCbs => HierarchicalCbsPlanner.solve(scenario, params, deadline),
        Algorithm::RuntimeReplanner => {
            RuntimeReplanner::static_map().solve(scenario, params, deadline)
        }
        Algorithm::AlternatingRuntimeReplanner => {
            RuntimeReplanner::alternating_map().solve(scenario, params, deadline)
        }
        Algorithm::TrafficSimulator => TrafficSimulator.solve(scenario, params, deadline),
    }
}
