//! The hierarchical repair loop.

use rustc_hash::FxHashMap;

use mapf_core::{
    AgentId, CommonPlan, Deadline, MapfResult, Plan, PlannerParams, Position, RegionId, Solution,
    TraversalId,
};
use mapf_map::Scenario;
use mapf_search::grid_astar;

use crate::cbs;
use crate::region::RegionGrid;
use crate::traversal::{HighLevelPlan, Traversal, TraversalArena};

pub struct HierarchicalCbsPlanner;

impl HierarchicalCbsPlanner {
    pub fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        let regions = RegionGrid::build(&scenario.map);
        let mut arena = TraversalArena::new();
        let mut highs: Vec<HighLevelPlan> = Vec::with_capacity(scenario.agent_count());

        // High-level route per agent over the pruned edge set, split into
        // one traversal per region visited.
        for agent in &scenario.agents {
            let goal = scenario.goal_of(agent.id).unwrap_or(agent.start);
            let route = grid_astar(
                agent.start,
                goal,
                |from, to| regions.is_route_edge(from.to(to)),
                deadline,
            )?;
            let Some(cells) = route else { return Ok(None) };
            highs.push(split_route(agent.id, &cells, &regions, &mut arena));
        }

        let mut by_region: FxHashMap<RegionId, Vec<TraversalId>> = FxHashMap::default();
        for traversal in arena.iter() {
            by_region.entry(traversal.region).or_default().push(traversal.id);
        }

        // Repair until the whole schedule is conflict-free.  Each round
        // fixes the earliest conflicting region; the budget caps pathological
        // repair ping-pong between regions.
        let rounds = params.trial_limit.max(1) as usize * regions.regions().len();
        for _ in 0..rounds {
            deadline.check()?;
            let Some(conflicted) = find_conflicted_region(&arena, &regions, &by_region) else {
                let plans = highs.iter().map(|high| high.assemble(&arena)).collect();
                return Ok(Some(Solution {
                    plan: CommonPlan::new(plans),
                    tasks: scenario.tasks.clone(),
                }));
            };

            let traversals = &by_region[&conflicted];
            let repaired = cbs::resolve_region(
                regions.region(conflicted),
                traversals,
                &arena,
                params,
                deadline,
            )?;
            match repaired {
                Some(pairs) => splice(&mut arena, &highs, pairs),
                None => return Ok(None),
            }
        }
        Ok(None)
    }
}

/// Cut a cell route into per-region traversals with linked neighbours.
pub(crate) fn split_route(
    agent: AgentId,
    cells: &[Position],
    regions: &RegionGrid,
    arena: &mut TraversalArena,
) -> HighLevelPlan {
    let mut ids: Vec<TraversalId> = Vec::new();
    let mut run_start = 0usize;

    for i in 1..=cells.len() {
        let run_ends =
            i == cells.len() || regions.region_of(cells[i]) != regions.region_of(cells[run_start]);
        if !run_ends {
            continue;
        }
        let slice = &cells[run_start..i];
        let id = arena.next_id();
        let prev = ids.last().copied().unwrap_or(TraversalId::INVALID);
        arena.push(Traversal {
            id,
            agent,
            region: regions.region_of(slice[0]),
            start: slice[0],
            target: slice[slice.len() - 1],
            start_time: run_start as u32,
            goal_region: i == cells.len(),
            prev,
            next: TraversalId::INVALID,
            plan: Plan::from_steps(
                slice
                    .iter()
                    .enumerate()
                    .map(|(k, &pos)| pos.at((run_start + k) as u32))
                    .collect(),
            ),
        });
        if prev != TraversalId::INVALID {
            arena.get_mut(prev).next = id;
        }
        ids.push(id);
        run_start = i;
    }

    HighLevelPlan { agent, traversals: ids }
}

/// The first region (scanning ticks outward, regions in index order) whose
/// traversals conflict.
fn find_conflicted_region(
    arena: &TraversalArena,
    regions: &RegionGrid,
    by_region: &FxHashMap<RegionId, Vec<TraversalId>>,
) -> Option<RegionId> {
    let makespan = arena.iter().map(Traversal::end_time).max()?;
    for t in 0..=makespan {
        for region in regions.regions() {
            let Some(traversals) = by_region.get(&region.id) else { continue };
            if traversals.len() >= 2 && conflict_at(traversals, arena, t) {
                return Some(region.id);
            }
        }
    }
    None
}

/// Any vertex or swap conflict between two of `traversals` at tick `t`?
fn conflict_at(traversals: &[TraversalId], arena: &TraversalArena, t: u32) -> bool {
    for i in 0..traversals.len() {
        for j in (i + 1)..traversals.len() {
            let a = arena.get(traversals[i]);
            let b = arena.get(traversals[j]);
            let (Some(a0), Some(b0)) = (a.position_at(t), b.position_at(t)) else { continue };
            if a0 == b0 {
                return true;
            }
            if let (Some(a1), Some(b1)) = (a.position_at(t + 1), b.position_at(t + 1)) {
                if a0 == b1 && b0 == a1 && a0 != a1 {
                    return true;
                }
            }
        }
    }
    false
}

/// Write repaired plans back into the arena, shifting every later traversal
/// of the same agent by the length difference.
fn splice(
    arena: &mut TraversalArena,
    highs: &[HighLevelPlan],
    repaired: Vec<(TraversalId, Plan)>,
) {
    let mut pending: FxHashMap<TraversalId, Plan> = repaired.into_iter().collect();
    for high in highs {
        let mut shift: i64 = 0;
        for &id in &high.traversals {
            let traversal = arena.get_mut(id);
            if shift != 0 {
                traversal.start_time = (i64::from(traversal.start_time) + shift) as u32;
                traversal.plan.shift_times(shift as i32);
            }
            if let Some(mut plan) = pending.remove(&id) {
                if shift != 0 {
                    plan.shift_times(shift as i32);
                }
                shift += plan.len() as i64 - traversal.plan.len() as i64;
                traversal.plan = plan;
            }
        }
    }
}
