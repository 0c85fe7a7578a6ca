//! Cooperative A*: sequential prioritized planning.
//!
//! Agents plan one after another in a shuffled priority order; each finished
//! path is written into the shared [`ReservationTable`] so later agents
//! route around it.  A failed agent discards the whole table and the run
//! retries with a fresh order, up to the trial limit.  Orders already tried
//! are fingerprinted and skipped.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashSet;

use mapf_core::{
    Agent, AgentId, CommonPlan, Deadline, MapfResult, Plan, PlannerParams, Position, Solution,
    TimedPosition,
};
use mapf_map::{MapManager, Scenario};
use mapf_reserve::ReservationTable;
use mapf_search::timed_astar;

pub struct CaStarPlanner;

impl CaStarPlanner {
    pub fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        let manager = scenario.manager(params.direction_change_frequency);
        let mut rng = SmallRng::seed_from_u64(params.seed);
        let mut tried: FxHashSet<Vec<AgentId>> = FxHashSet::default();
        let mut order: Vec<AgentId> = scenario.agents.iter().map(|a| a.id).collect();

        for trial in 0..params.trial_limit.max(1) {
            deadline.check()?;
            if trial > 0 {
                order.shuffle(&mut rng);
            }
            if !tried.insert(order.clone()) {
                continue;
            }
            if let Some(plan) = plan_order(scenario, &order, manager, params, deadline)? {
                return Ok(Some(Solution { plan, tasks: scenario.tasks.clone() }));
            }
        }
        Ok(None)
    }
}

/// Plan every agent in `order` against one shared table.  `None` discards
/// the table and reports the order as failed.
fn plan_order(
    scenario: &Scenario,
    order: &[AgentId],
    manager: MapManager<'_>,
    params: &PlannerParams,
    deadline: &Deadline,
) -> MapfResult<Option<CommonPlan>> {
    let mut table = ReservationTable::new();
    let mut plans: Vec<Option<Plan>> = vec![None; scenario.agent_count()];

    for &id in order {
        let agent = &scenario.agents[id.index()];
        match plan_agent(scenario, agent, &mut table, manager, params, deadline)? {
            Some(plan) => plans[id.index()] = Some(plan),
            None => return Ok(None),
        }
    }

    let plans = plans.into_iter().map(|p| p.expect("every agent planned")).collect();
    Ok(Some(CommonPlan::new(plans)))
}

/// One agent: a timed search per sub-target, reserving the path as it is
/// reconstructed and ending in a permanent-from claim on the final cell.
fn plan_agent(
    scenario: &Scenario,
    agent: &Agent,
    table: &mut ReservationTable,
    manager: MapManager<'_>,
    params: &PlannerParams,
    deadline: &Deadline,
) -> MapfResult<Option<Plan>> {
    let start = agent.start.at(0);

    let targets = match agent.task {
        Some(task) => scenario.task(task).targets.clone(),
        None => Vec::new(),
    };
    if targets.is_empty() {
        // Task-less agents rest on their start cell for the whole run.
        table.reserve_cell(agent.id, agent.start, 0, true);
        return Ok(Some(Plan::new(start)));
    }

    let mut full: Option<Plan> = None;
    let mut seed = start;
    for (k, &target) in targets.iter().enumerate() {
        let is_final = k + 1 == targets.len();
        let outcome = {
            let legal = |from: Position, to: Position, t: u32| {
                if !table.is_cell_free(to, t + 1) {
                    return false;
                }
                from == to || (table.is_edge_free(from, to, t) && manager.permitted(from.to(to), t))
            };
            let accept = |node: TimedPosition| {
                node.pos == target && (!is_final || table.is_free_forever(target, node.time))
            };
            timed_astar(
                seed,
                legal,
                |pos| pos.manhattan(target),
                accept,
                params.time_horizon,
                deadline,
            )?
        };
        let Some(leg) = outcome.into_plan() else {
            return Ok(None);
        };

        seed = leg.last().expect("a found leg is never empty");
        table.reserve_path(agent.id, leg.steps(), full.is_some(), is_final);
        match &mut full {
            None => full = Some(leg),
            Some(plan) => plan.append_plan(leg),
        }
    }
    Ok(full)
}
