//! Runtime replanner: independent seed plans, then per-tick claim-based
//! deconfliction with recursive backtracking.
//!
//! Each agent first plans alone — plain grid A* on a static map, the
//! phase-folded variant on an alternating one.  Execution then walks tick
//! by tick: every agent claims the cell it wants next (and the passage to
//! it) in a [`ClaimContainer`]; an agent whose claim is denied backtracks
//! through its neighbours sorted by goal distance, with waiting as the last
//! resort.  Agents pushed off their plan are cut, padded, and replanned
//! from their realized position.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use mapf_core::{
    AgentId, CommonPlan, Deadline, MapfResult, Plan, PlannerParams, Position, Solution,
};
use mapf_map::{MapManager, Scenario};
use mapf_reserve::ClaimContainer;
use mapf_search::{alternating_astar, grid_astar};

/// Static (`alternating = false`) or direction-alternating runtime
/// replanner.  The alternating variant reads the frequency from
/// [`PlannerParams::direction_change_frequency`].
pub struct RuntimeReplanner {
    alternating: bool,
}

impl RuntimeReplanner {
    pub fn static_map() -> Self {
        Self { alternating: false }
    }

    pub fn alternating_map() -> Self {
        Self { alternating: true }
    }

    pub fn solve(
        &self,
        scenario: &Scenario,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Solution>> {
        let frequency = if self.alternating { params.direction_change_frequency } else { 0 };
        let manager = scenario.manager(frequency);
        let mut rng = SmallRng::seed_from_u64(params.seed);

        let goals: Vec<Position> = scenario
            .agents
            .iter()
            .map(|a| scenario.goal_of(a.id).unwrap_or(a.start))
            .collect();

        // Seed plans, each agent alone on the map.
        let mut plans: Vec<Plan> = Vec::with_capacity(scenario.agent_count());
        for agent in &scenario.agents {
            match self.seed_plan(agent.start, goals[agent.id.index()], manager, params, deadline)? {
                Some(plan) => plans.push(plan),
                None => return Ok(None),
            }
        }

        let mut positions: Vec<Position> = scenario.agents.iter().map(|a| a.start).collect();
        let base_order: Vec<AgentId> = scenario.agents.iter().map(|a| a.id).collect();
        let mut claims = ClaimContainer::new();

        let mut now: u32 = 0;
        loop {
            let done = base_order.iter().all(|&a| {
                positions[a.index()] == goals[a.index()] && plans[a.index()].end_time() <= now
            });
            if done {
                break;
            }
            if now >= params.time_horizon {
                return Ok(None);
            }
            deadline.check()?;

            // Deconfliction: natural order first, then shuffled retries.
            let mut order = base_order.clone();
            let mut settled = false;
            for trial in 0..params.trial_limit.max(1) {
                if trial > 0 {
                    order.shuffle(&mut rng);
                }
                claims.clear();
                if step(&order, 0, now, &mut claims, &plans, &positions, &goals, manager).is_ok() {
                    settled = true;
                    break;
                }
            }
            if !settled {
                return Ok(None);
            }

            // Apply claims; replan agents that went off-track.
            for &agent in &base_order {
                let realized = claims.target_of(agent).expect("every agent claimed a step");
                let planned = plans[agent.index()]
                    .position_at(now + 1, true)
                    .expect("plans start at tick 0");
                positions[agent.index()] = realized;
                if realized == planned {
                    continue;
                }

                let plan = &mut plans[agent.index()];
                plan.cut_after(now);
                plan.fill_up_to(now);
                plan.push(realized);
                if realized == goals[agent.index()] {
                    continue;
                }
                let resumed = self.resume_plan(
                    realized,
                    now + 1,
                    goals[agent.index()],
                    manager,
                    params,
                    deadline,
                )?;
                match resumed {
                    Some(tail) => plans[agent.index()].append_plan(tail),
                    // An agent that cannot reach its goal any more is
                    // incapable; the scenario fails.
                    None => return Ok(None),
                }
            }
            now += 1;
        }

        Ok(Some(Solution { plan: CommonPlan::new(plans), tasks: scenario.tasks.clone() }))
    }

    /// Single-agent plan from a cold start at tick 0.
    fn seed_plan(
        &self,
        start: Position,
        goal: Position,
        manager: MapManager<'_>,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Plan>> {
        self.lone_plan(start, 0, goal, manager, params, deadline)
    }

    /// Replan a pushed-off agent from its realized position.
    fn resume_plan(
        &self,
        from: Position,
        time: u32,
        goal: Position,
        manager: MapManager<'_>,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Plan>> {
        self.lone_plan(from, time, goal, manager, params, deadline)
    }

    fn lone_plan(
        &self,
        from: Position,
        time: u32,
        goal: Position,
        manager: MapManager<'_>,
        params: &PlannerParams,
        deadline: &Deadline,
    ) -> MapfResult<Option<Plan>> {
        if self.alternating {
            let legal = |a: Position, b: Position, t: u32| {
                if a == b {
                    !manager.map().is_obstacle(a) && manager.map().in_bounds(a)
                } else {
                    manager.permitted(a.to(b), t)
                }
            };
            let outcome = alternating_astar(
                from.at(time),
                goal,
                legal,
                manager.frequency(),
                params.time_horizon,
                deadline,
            )?;
            Ok(outcome.into_plan())
        } else {
            let map = manager.map();
            let cells = grid_astar(from, goal, |a, b| map.has_edge(a.to(b)), deadline)?;
            Ok(cells.map(|cells| {
                Plan::from_steps(
                    cells.into_iter().enumerate().map(|(i, pos)| pos.at(time + i as u32)).collect(),
                )
            }))
        }
    }
}

// ── Per-tick backtracking ─────────────────────────────────────────────────────

/// Claim a step for `order[index]` and recurse to the rest.  On failure the
/// incapable agent's id bubbles up so the outer loop can reshuffle.
fn step(
    order: &[AgentId],
    index: usize,
    now: u32,
    claims: &mut ClaimContainer,
    plans: &[Plan],
    positions: &[Position],
    goals: &[Position],
    manager: MapManager<'_>,
) -> Result<(), AgentId> {
    let agent = order[index];
    let cur = positions[agent.index()];
    let planned = plans[agent.index()].position_at(now + 1, true).expect("plans start at tick 0");
    let is_last = index + 1 == order.len();

    let mut attempt = |claims: &mut ClaimContainer, to: Position| -> bool {
        if !claims.try_claim(agent, cur, to) {
            return false;
        }
        if is_last || step(order, index + 1, now, claims, plans, positions, goals, manager).is_ok()
        {
            return true;
        }
        claims.remove_claims(agent);
        false
    };

    if attempt(claims, planned) {
        return Ok(());
    }

    // Alternatives: passable neighbours sorted by goal distance, then wait.
    let goal = goals[agent.index()];
    let mut alternatives: Vec<Position> = cur
        .neighbours()
        .into_iter()
        .filter(|&alt| alt != planned && manager.permitted(cur.to(alt), now))
        .collect();
    alternatives.sort_unstable_by_key(|alt| (alt.manhattan(goal), alt.x, alt.y));
    if cur != planned {
        alternatives.push(cur);
    }

    for alt in alternatives {
        if attempt(claims, alt) {
            return Ok(());
        }
    }
    Err(agent)
}
